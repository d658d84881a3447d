//! ---
//! gf_section: "11-simulation"
//! gf_subsection: "module"
//! gf_type: "source"
//! gf_scope: "code"
//! gf_description: "Fleet roster generation with correlated attributes."
//! gf_version: "v0.1.0"
//! gf_owner: "tbd"
//! ---
use chrono::Duration;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;
use uuid::Uuid;

use genfleet_common::config::FleetConfig;

use crate::errors::{Result, SimulationError};
use crate::model::{Generator, GeneratorStatus, Protocol, SimulationWindow};

/// Catalog of unit models. Rated power and phase count are fixed per model
/// so the roster carries realistic attribute correlations.
const MODEL_CATALOG: &[(&str, f64, u8)] = &[
    ("GP-45 Compact", 45.0, 1),
    ("GP-80 Mobile", 80.0, 1),
    ("GP-150 Standby", 150.0, 3),
    ("GP-300 Prime", 300.0, 3),
    ("GP-800 Industrial", 800.0, 3),
    ("GP-1250 Utility", 1250.0, 3),
];

const SITES: &[&str] = &[
    "Riverside Plant",
    "Harbor Terminal",
    "North Quarry",
    "Cedar Data Center",
    "Summit Mine",
    "Lakeside Hospital",
    "Eastgate Campus",
    "Prairie Substation",
];

const CUSTOMERS: &[&str] = &[
    "Meridian Utilities",
    "Cascade Mining Co",
    "Atlas Logistics",
    "Northwind Health",
    "Pioneer Agritech",
    "Stonebridge Data",
];

const PROTOCOLS: &[Protocol] = &[
    Protocol::Modbus,
    Protocol::CanJ1939,
    Protocol::Snmp,
    Protocol::Mqtt,
];

const STATUS_ORDER: [GeneratorStatus; 4] = [
    GeneratorStatus::Running,
    GeneratorStatus::Standby,
    GeneratorStatus::Offline,
    GeneratorStatus::Maintenance,
];

// Continental deployment bounding box.
const LAT_RANGE: (f64, f64) = (29.0, 48.5);
const LNG_RANGE: (f64, f64) = (-122.0, -71.0);

/// Generate the static fleet roster. Deterministic for a fixed rng state;
/// the window supplies the reference "now" for commission dates and
/// heartbeats.
pub fn generate_fleet(
    config: &FleetConfig,
    window: &SimulationWindow,
    rng: &mut StdRng,
) -> Result<Vec<Generator>> {
    if config.units == 0 {
        return Err(SimulationError::EmptyFleet);
    }
    let status_dist = WeightedIndex::new(config.status_mix.weights())
        .map_err(|_| SimulationError::InvalidStatusMix)?;

    let now = window.end;
    let mut fleet = Vec::with_capacity(config.units);
    for _ in 0..config.units {
        let (model, rated_kw, phases) = MODEL_CATALOG[rng.gen_range(0..MODEL_CATALOG.len())];
        let latitude = rng.gen_range(LAT_RANGE.0..LAT_RANGE.1);
        let longitude = rng.gen_range(LNG_RANGE.0..LNG_RANGE.1);

        // 1-10 years in service, warranty 3-7 years from commissioning.
        let commissioned_at = now - Duration::days(rng.gen_range(365..=3650));
        let warranty_until = commissioned_at + Duration::days(rng.gen_range(1095..=2555));

        let status = STATUS_ORDER[status_dist.sample(rng)];
        let last_heartbeat = match status {
            // An offline unit stopped reporting somewhere in the last 1-72h.
            GeneratorStatus::Offline => now - Duration::seconds(rng.gen_range(3_600..=259_200)),
            _ => now - Duration::seconds(rng.gen_range(0..=600)),
        };

        let serial_number = format!(
            "GF-{}-{:05}",
            commissioned_at.format("%Y"),
            rng.gen_range(0..100_000)
        );

        fleet.push(Generator {
            id: Uuid::from_u128(rng.gen()),
            serial_number,
            model: model.to_owned(),
            protocol: PROTOCOLS[rng.gen_range(0..PROTOCOLS.len())],
            rated_kw,
            phases,
            site: SITES[rng.gen_range(0..SITES.len())].to_owned(),
            customer: CUSTOMERS[rng.gen_range(0..CUSTOMERS.len())].to_owned(),
            region: region_for(latitude, longitude),
            latitude,
            longitude,
            commissioned_at,
            warranty_until,
            status,
            last_heartbeat,
        });
    }
    Ok(fleet)
}

/// Region label derived from the coordinate's quadrant of the bounding box.
fn region_for(latitude: f64, longitude: f64) -> String {
    let north = latitude >= (LAT_RANGE.0 + LAT_RANGE.1) / 2.0;
    let east = longitude >= (LNG_RANGE.0 + LNG_RANGE.1) / 2.0;
    match (north, east) {
        (true, true) => "Northeast",
        (true, false) => "Northwest",
        (false, true) => "Southeast",
        (false, false) => "Southwest",
    }
    .to_owned()
}
