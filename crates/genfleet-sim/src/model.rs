//! ---
//! gf_section: "11-simulation"
//! gf_subsection: "module"
//! gf_type: "source"
//! gf_scope: "code"
//! gf_description: "Data model for the fleet simulator and derived products."
//! gf_version: "v0.1.0"
//! gf_owner: "tbd"
//! ---
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, SimulationError};

/// A single generator unit in the simulated fleet. Immutable after creation;
/// downstream stages hold read-only references keyed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generator {
    pub id: Uuid,
    pub serial_number: String,
    pub model: String,
    pub protocol: Protocol,
    /// Rated output in kW, always positive.
    pub rated_kw: f64,
    /// Electrical phase count, 1 or 3.
    pub phases: u8,
    pub site: String,
    pub customer: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub commissioned_at: DateTime<Utc>,
    pub warranty_until: DateTime<Utc>,
    pub status: GeneratorStatus,
    /// Recent for reporting units; stale by 1-72 hours for Offline units.
    pub last_heartbeat: DateTime<Utc>,
}

/// Communication protocol spoken by a unit's controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Protocol {
    Modbus,
    CanJ1939,
    Snmp,
    Mqtt,
}

/// Operational status of a generator unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GeneratorStatus {
    Running,
    Standby,
    Offline,
    Maintenance,
}

impl GeneratorStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, GeneratorStatus::Running)
    }
}

/// One telemetry record per (generator, timestamp) at the window's sampling
/// interval. Emitted once by the synthesizer and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub generator_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Cumulative engine odometer. Non-decreasing while the unit is Running,
    /// frozen otherwise.
    pub run_hours_total: f64,
    pub fuel_level_pct: f64,
    pub coolant_temp_c: f64,
    pub oil_pressure_kpa: f64,
    pub battery_voltage_v: f64,
    pub load_kw: f64,
    pub load_pct: f64,
    pub frequency_hz: f64,
    pub power_factor: f64,
    pub ambient_temp_c: f64,
}

/// Derived performance indicators for one generator, computed once over the
/// full available metric window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kpi {
    pub generator_id: Uuid,
    pub uptime_pct_7d: f64,
    pub uptime_pct_30d: f64,
    pub avg_load_pct: f64,
    pub utilization_hours_7d: f64,
    pub mtbf_hours: f64,
    pub mttr_hours: f64,
    pub est_fuel_rate_lph: f64,
    /// Negative means the unit is past its service interval.
    pub next_service_due_hours: f64,
    pub maintenance_overdue: bool,
    /// Composite rule-based condition score in [0, 100].
    pub health_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// Fixed taxonomy of alert causes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AlertCode {
    FuelLow,
    CoolantHigh,
    OilPressureLow,
    BatteryLow,
    Overload,
    HeartbeatLost,
}

/// A rule breach that passed emission sampling. Mutable only through
/// [`Alert::acknowledge`] and [`Alert::resolve`], which belong to the
/// downstream operator workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub generator_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
    pub code: AlertCode,
    pub message: String,
    pub acknowledged: bool,
    pub resolved: bool,
}

impl Alert {
    pub fn acknowledge(&mut self) {
        self.acknowledged = true;
    }

    pub fn resolve(&mut self) {
        self.acknowledged = true;
        self.resolved = true;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    Dispatched,
    InProgress,
    OnHold,
}

/// Maintenance ticket derived from KPI state; mutated only by external
/// maintenance workflows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTicket {
    pub id: u64,
    pub generator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub priority: TicketPriority,
    pub assignee: Option<String>,
    pub status: TicketStatus,
    pub eta: Option<DateTime<Utc>>,
    pub notes: String,
}

/// The discretized simulation window: a trailing span of `days` ending at
/// `end`, sampled every `interval_minutes`.
///
/// Step iteration is half-open over `[start, end)`, so a 1-day window at a
/// 5-minute interval yields exactly 288 timestamps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationWindow {
    pub end: DateTime<Utc>,
    pub days: u32,
    pub interval_minutes: u32,
}

impl SimulationWindow {
    pub fn new(end: DateTime<Utc>, days: u32, interval_minutes: u32) -> Result<Self> {
        if days == 0 {
            return Err(SimulationError::WindowTooShort(days));
        }
        if interval_minutes == 0 {
            return Err(SimulationError::ZeroInterval);
        }
        Ok(Self {
            end,
            days,
            interval_minutes,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.end - Duration::days(i64::from(self.days))
    }

    pub fn interval(&self) -> Duration {
        Duration::minutes(i64::from(self.interval_minutes))
    }

    pub fn interval_hours(&self) -> f64 {
        f64::from(self.interval_minutes) / 60.0
    }

    /// Number of sampling steps per unit over the full window.
    pub fn steps(&self) -> u64 {
        u64::from(self.days) * 24 * 60 / u64::from(self.interval_minutes)
    }

    /// Expected sample count for the trailing `days` sub-window, clipped to
    /// the simulated span.
    pub fn expected_samples(&self, days: u32) -> u64 {
        u64::from(days.min(self.days)) * 24 * 60 / u64::from(self.interval_minutes)
    }

    /// Timestamp `hours` before the window end.
    pub fn trailing(&self, hours: i64) -> DateTime<Utc> {
        self.end - Duration::hours(hours)
    }

    /// Ascending sampling timestamps over `[start, end)`.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> {
        let start = self.start();
        let interval = self.interval();
        (0..self.steps()).map(move |step| start + interval * step as i32)
    }
}
