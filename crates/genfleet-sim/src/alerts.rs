//! ---
//! gf_section: "11-simulation"
//! gf_subsection: "module"
//! gf_type: "source"
//! gf_scope: "code"
//! gf_description: "Threshold alert rules with stochastic emission sampling."
//! gf_version: "v0.1.0"
//! gf_owner: "tbd"
//! ---
use chrono::Duration;
use rand::rngs::StdRng;
use rand::Rng;

use genfleet_common::config::AlertPolicy;

use crate::model::{Alert, AlertCode, AlertSeverity, Generator, GeneratorStatus, MetricSample};

pub const FUEL_LOW_PCT: f64 = 15.0;
pub const FUEL_CRITICAL_PCT: f64 = 10.0;
pub const COOLANT_HIGH_C: f64 = 95.0;
pub const OIL_LOW_KPA: f64 = 250.0;
pub const BATTERY_LOW_V: f64 = 12.0;
pub const OVERLOAD_PCT: f64 = 90.0;
pub const HEARTBEAT_GRACE_MINUTES: i64 = 30;

/// A rule breach detected on a single sample, before emission sampling.
#[derive(Debug, Clone)]
pub struct Breach {
    pub code: AlertCode,
    pub severity: AlertSeverity,
    pub message: String,
}

/// Evaluate the five threshold rules against one sample. Rules are
/// independent; a sample can breach several at once.
pub fn breaches(sample: &MetricSample) -> Vec<Breach> {
    let mut hits = Vec::new();
    if sample.fuel_level_pct < FUEL_LOW_PCT {
        let severity = if sample.fuel_level_pct < FUEL_CRITICAL_PCT {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        };
        hits.push(Breach {
            code: AlertCode::FuelLow,
            severity,
            message: format!(
                "fuel level at {:.1}% (threshold {:.0}%)",
                sample.fuel_level_pct, FUEL_LOW_PCT
            ),
        });
    }
    if sample.coolant_temp_c > COOLANT_HIGH_C {
        hits.push(Breach {
            code: AlertCode::CoolantHigh,
            severity: AlertSeverity::Critical,
            message: format!(
                "coolant temperature at {:.1}C (threshold {:.0}C)",
                sample.coolant_temp_c, COOLANT_HIGH_C
            ),
        });
    }
    if sample.oil_pressure_kpa < OIL_LOW_KPA {
        hits.push(Breach {
            code: AlertCode::OilPressureLow,
            severity: AlertSeverity::Critical,
            message: format!(
                "oil pressure at {:.0} kPa (threshold {:.0} kPa)",
                sample.oil_pressure_kpa, OIL_LOW_KPA
            ),
        });
    }
    if sample.battery_voltage_v < BATTERY_LOW_V {
        hits.push(Breach {
            code: AlertCode::BatteryLow,
            severity: AlertSeverity::Warning,
            message: format!(
                "battery voltage at {:.2} V (threshold {:.1} V)",
                sample.battery_voltage_v, BATTERY_LOW_V
            ),
        });
    }
    if sample.load_pct > OVERLOAD_PCT {
        hits.push(Breach {
            code: AlertCode::Overload,
            severity: AlertSeverity::Warning,
            message: format!(
                "load at {:.1}% (threshold {:.0}%)",
                sample.load_pct, OVERLOAD_PCT
            ),
        });
    }
    hits
}

fn emit_probability(policy: &AlertPolicy, code: AlertCode) -> f64 {
    match code {
        AlertCode::FuelLow => policy.fuel_low_emit,
        AlertCode::CoolantHigh => policy.coolant_high_emit,
        AlertCode::OilPressureLow => policy.oil_pressure_low_emit,
        AlertCode::BatteryLow => policy.battery_low_emit,
        AlertCode::Overload => policy.overload_emit,
        AlertCode::HeartbeatLost => 1.0,
    }
}

/// Pre-seed operator workflow flags so the generated log looks like a lived-in
/// backlog rather than a pristine queue. Seeding stage only; live
/// acknowledge/resolve transitions go through [`Alert::acknowledge`] and
/// [`Alert::resolve`].
fn seed_backlog_flags(rng: &mut StdRng) -> (bool, bool) {
    let resolved = rng.gen::<f64>() < 0.45;
    let acknowledged = resolved || rng.gen::<f64>() < 0.30;
    (acknowledged, resolved)
}

/// Evaluate every sample against the rule table, down-sampling qualifying
/// breaches by the per-rule emission probability, then synthesize one
/// communication-lost alert per Offline unit. Alert ids increase
/// monotonically in emission order.
pub fn evaluate(
    fleet: &[Generator],
    samples: &[MetricSample],
    policy: &AlertPolicy,
    rng: &mut StdRng,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let mut next_id: u64 = 1;

    for sample in samples {
        for breach in breaches(sample) {
            if rng.gen::<f64>() >= emit_probability(policy, breach.code) {
                continue;
            }
            let (acknowledged, resolved) = seed_backlog_flags(rng);
            alerts.push(Alert {
                id: next_id,
                generator_id: sample.generator_id,
                timestamp: sample.timestamp,
                severity: breach.severity,
                code: breach.code,
                message: breach.message,
                acknowledged,
                resolved,
            });
            next_id += 1;
        }
    }

    for unit in fleet {
        if unit.status != GeneratorStatus::Offline {
            continue;
        }
        let (acknowledged, resolved) = seed_backlog_flags(rng);
        alerts.push(Alert {
            id: next_id,
            generator_id: unit.id,
            timestamp: unit.last_heartbeat + Duration::minutes(HEARTBEAT_GRACE_MINUTES),
            severity: AlertSeverity::Critical,
            code: AlertCode::HeartbeatLost,
            message: format!("no heartbeat from {} since last report", unit.serial_number),
            acknowledged,
            resolved,
        });
        next_id += 1;
    }

    alerts
}
