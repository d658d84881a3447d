//! ---
//! gf_section: "11-simulation"
//! gf_subsection: "module"
//! gf_type: "source"
//! gf_scope: "code"
//! gf_description: "Maintenance ticket derivation from KPI state."
//! gf_version: "v0.1.0"
//! gf_owner: "tbd"
//! ---
use chrono::{DateTime, Duration, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;

use crate::model::{Generator, Kpi, ServiceTicket, TicketPriority, TicketStatus};

const TICKET_PROB: f64 = 0.70;
const HEALTH_TICKET_FLOOR: f64 = 70.0;
const ETA_PROB: f64 = 0.50;
const UNASSIGNED_PROB: f64 = 0.25;

const TECHNICIANS: &[&str] = &[
    "R. Vasquez",
    "M. Okafor",
    "J. Lindqvist",
    "A. Tanaka",
    "D. Whitfield",
    "S. Moreau",
];

const NOTES: &[&str] = &[
    "Customer reports intermittent shutdowns under load.",
    "Scheduled service interval exceeded; full inspection due.",
    "Coolant system flagged by remote monitoring.",
    "Battery bank nearing end of service life.",
    "Oil analysis requested before next load test.",
    "Transfer switch exercise and load bank test pending.",
];

const PRIORITY_ORDER: [TicketPriority; 4] = [
    TicketPriority::Low,
    TicketPriority::Medium,
    TicketPriority::High,
    TicketPriority::Urgent,
];
const PRIORITY_WEIGHTS: [f64; 4] = [0.15, 0.40, 0.30, 0.15];

const STATUS_CHOICES: [TicketStatus; 4] = [
    TicketStatus::Open,
    TicketStatus::Dispatched,
    TicketStatus::InProgress,
    TicketStatus::OnHold,
];
const STATUS_WEIGHTS: [f64; 4] = [0.40, 0.20, 0.30, 0.10];

/// Derive service tickets for units flagged as overdue or unhealthy.
/// Ticket fields are seeded backlog state; derivation consumes only the KPI
/// snapshot, never the alert log.
pub fn derive_tickets(
    fleet: &[Generator],
    kpis: &[Kpi],
    reference: DateTime<Utc>,
    rng: &mut StdRng,
) -> Vec<ServiceTicket> {
    let priority_dist = WeightedIndex::new(PRIORITY_WEIGHTS).expect("static weights are valid");
    let status_dist = WeightedIndex::new(STATUS_WEIGHTS).expect("static weights are valid");

    let mut tickets = Vec::new();
    let mut next_id: u64 = 1;
    for unit in fleet {
        let Some(kpi) = kpis.iter().find(|k| k.generator_id == unit.id) else {
            continue;
        };
        if !kpi.maintenance_overdue && kpi.health_score >= HEALTH_TICKET_FLOOR {
            continue;
        }
        if rng.gen::<f64>() >= TICKET_PROB {
            continue;
        }

        let created_at = reference - Duration::minutes(rng.gen_range(0..=14 * 24 * 60));
        let assignee = if rng.gen::<f64>() < UNASSIGNED_PROB {
            None
        } else {
            Some(TECHNICIANS[rng.gen_range(0..TECHNICIANS.len())].to_owned())
        };
        let eta = if rng.gen::<f64>() < ETA_PROB {
            Some(created_at + Duration::days(rng.gen_range(1..=30)))
        } else {
            None
        };

        tickets.push(ServiceTicket {
            id: next_id,
            generator_id: unit.id,
            created_at,
            priority: PRIORITY_ORDER[priority_dist.sample(rng)],
            assignee,
            status: STATUS_CHOICES[status_dist.sample(rng)],
            eta,
            notes: NOTES[rng.gen_range(0..NOTES.len())].to_owned(),
        });
        next_id += 1;
    }
    tickets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeneratorStatus, Protocol};
    use chrono::TimeZone;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn unit(id: u128, reference: DateTime<Utc>) -> Generator {
        Generator {
            id: Uuid::from_u128(id),
            serial_number: format!("GF-2022-{id:05}"),
            model: "GP-150 Standby".into(),
            protocol: Protocol::Mqtt,
            rated_kw: 150.0,
            phases: 3,
            site: "Eastgate Campus".into(),
            customer: "Stonebridge Data".into(),
            region: "Southeast".into(),
            latitude: 33.0,
            longitude: -81.0,
            commissioned_at: reference - Duration::days(700),
            warranty_until: reference + Duration::days(700),
            status: GeneratorStatus::Running,
            last_heartbeat: reference - Duration::minutes(1),
        }
    }

    fn kpi(id: u128, overdue: bool, health: f64) -> Kpi {
        Kpi {
            generator_id: Uuid::from_u128(id),
            uptime_pct_7d: 90.0,
            uptime_pct_30d: 92.0,
            avg_load_pct: 55.0,
            utilization_hours_7d: 100.0,
            mtbf_hours: 1200.0,
            mttr_hours: 8.0,
            est_fuel_rate_lph: 0.33,
            next_service_due_hours: if overdue { -10.0 } else { 120.0 },
            maintenance_overdue: overdue,
            health_score: health,
        }
    }

    #[test]
    fn healthy_current_units_get_no_tickets() {
        let reference = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let fleet = vec![unit(1, reference)];
        let kpis = vec![kpi(1, false, 95.0)];
        let mut rng = StdRng::seed_from_u64(8);
        assert!(derive_tickets(&fleet, &kpis, reference, &mut rng).is_empty());
    }

    #[test]
    fn flagged_units_get_tickets_at_roughly_seventy_percent() {
        let reference = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let count = 2_000u128;
        let fleet: Vec<Generator> = (0..count).map(|i| unit(i, reference)).collect();
        let kpis: Vec<Kpi> = (0..count).map(|i| kpi(i, true, 50.0)).collect();
        let mut rng = StdRng::seed_from_u64(8);
        let tickets = derive_tickets(&fleet, &kpis, reference, &mut rng);
        let rate = tickets.len() as f64 / count as f64;
        assert!((rate - TICKET_PROB).abs() < 0.05, "ticket rate {rate}");
    }

    #[test]
    fn ticket_fields_are_plausible_backlog_state() {
        let reference = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let fleet: Vec<Generator> = (0..200).map(|i| unit(i, reference)).collect();
        let kpis: Vec<Kpi> = (0..200).map(|i| kpi(i, false, 40.0)).collect();
        let mut rng = StdRng::seed_from_u64(21);
        let tickets = derive_tickets(&fleet, &kpis, reference, &mut rng);
        assert!(!tickets.is_empty());
        for ticket in &tickets {
            assert!(ticket.created_at <= reference);
            assert!(ticket.created_at >= reference - Duration::days(14));
            if let Some(eta) = ticket.eta {
                assert!(eta > ticket.created_at);
                assert!(eta <= ticket.created_at + Duration::days(30));
            }
        }
        assert!(tickets.iter().any(|t| t.assignee.is_none()));
        assert!(tickets.iter().any(|t| t.assignee.is_some()));
    }
}
