//! ---
//! gf_section: "11-simulation"
//! gf_subsection: "01-bootstrap"
//! gf_type: "source"
//! gf_scope: "code"
//! gf_description: "Simulation pipeline exports and dataset assembly."
//! gf_version: "v0.1.0"
//! gf_owner: "tbd"
//! ---
//! Fleet telemetry simulation and derived-metrics engines for GenFleet.
//!
//! The pipeline runs strictly downward: fleet roster, metric series, then
//! KPIs and alerts in either order, then maintenance tickets. Every stage
//! draws from one explicitly threaded seeded rng, so a fixed (seed,
//! reference time) pair reproduces the dataset byte-for-byte.

pub mod alerts;
pub mod errors;
pub mod fleet;
pub mod kpi;
pub mod model;
pub mod telemetry;
pub mod tickets;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use genfleet_common::config::SimConfig;

pub use errors::{Result, SimulationError};
pub use model::{
    Alert, AlertCode, AlertSeverity, Generator, GeneratorStatus, Kpi, MetricSample, Protocol,
    ServiceTicket, SimulationWindow, TicketPriority, TicketStatus,
};

/// The four data products of the core plus the derived ticket backlog.
/// Downstream consumers (UI, persistence) read these by generator id and by
/// timestamp range; nothing here is mutated after generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetDataset {
    pub window: SimulationWindow,
    pub fleet: Vec<Generator>,
    pub samples: Vec<MetricSample>,
    pub kpis: Vec<Kpi>,
    pub alerts: Vec<Alert>,
    pub tickets: Vec<ServiceTicket>,
}

impl FleetDataset {
    pub fn generator(&self, id: Uuid) -> Option<&Generator> {
        self.fleet.iter().find(|g| g.id == id)
    }

    pub fn kpi_for(&self, id: Uuid) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.generator_id == id)
    }

    pub fn samples_for(&self, id: Uuid) -> impl Iterator<Item = &MetricSample> {
        self.samples.iter().filter(move |s| s.generator_id == id)
    }

    pub fn samples_between(
        &self,
        id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Iterator<Item = &MetricSample> {
        self.samples_for(id)
            .filter(move |s| s.timestamp >= from && s.timestamp < to)
    }

    pub fn alerts_for(&self, id: Uuid) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(move |a| a.generator_id == id)
    }

    pub fn tickets_for(&self, id: Uuid) -> impl Iterator<Item = &ServiceTicket> {
        self.tickets.iter().filter(move |t| t.generator_id == id)
    }
}

/// Run the full generation pipeline for the configured fleet and window,
/// ending at `reference` (the simulated "now").
///
/// Parameters are validated up front; generation itself cannot fail.
pub fn generate_dataset(config: &SimConfig, reference: DateTime<Utc>) -> Result<FleetDataset> {
    let window = SimulationWindow::new(
        reference,
        config.window.days,
        config.window.interval_minutes,
    )?;
    if config.fleet.units == 0 {
        return Err(SimulationError::EmptyFleet);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);

    info!(units = config.fleet.units, "generating fleet roster");
    let fleet = fleet::generate_fleet(&config.fleet, &window, &mut rng)?;

    info!(
        days = window.days,
        interval_minutes = window.interval_minutes,
        "synthesizing metric series"
    );
    let samples = telemetry::synthesize(&fleet, &window, &mut rng)?;

    info!(samples = samples.len(), "computing KPIs");
    let kpis = kpi::compute_kpis(&fleet, &samples, &config.health, &window, &mut rng);

    info!("evaluating alert rules");
    let alerts = alerts::evaluate(&fleet, &samples, &config.alerts, &mut rng);

    info!(alerts = alerts.len(), "deriving maintenance tickets");
    let tickets = tickets::derive_tickets(&fleet, &kpis, reference, &mut rng);

    info!(
        units = fleet.len(),
        samples = samples.len(),
        alerts = alerts.len(),
        tickets = tickets.len(),
        "dataset generation complete"
    );

    Ok(FleetDataset {
        window,
        fleet,
        samples,
        kpis,
        alerts,
        tickets,
    })
}
