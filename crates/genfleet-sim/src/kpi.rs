//! ---
//! gf_section: "11-simulation"
//! gf_subsection: "module"
//! gf_type: "source"
//! gf_scope: "code"
//! gf_description: "KPI derivation and composite health scoring."
//! gf_version: "v0.1.0"
//! gf_owner: "tbd"
//! ---
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use statrs::statistics::Statistics;
use uuid::Uuid;

use genfleet_common::config::HealthPolicy;

use crate::model::{Generator, GeneratorStatus, Kpi, MetricSample, SimulationWindow};

/// Uptime is capped below 100 so dense sampling alone never implies a
/// perfect record.
const UPTIME_CAP_PCT: f64 = 95.0;
const UTILIZATION_LOAD_FLOOR_PCT: f64 = 10.0;
const HEALTH_JITTER_SIGMA: f64 = 3.0;
const HEARTBEAT_STALE_MINUTES: i64 = 30;

const COOLANT_SEVERE_C: f64 = 90.0;
const COOLANT_WARN_C: f64 = 85.0;
const OIL_SEVERE_KPA: f64 = 200.0;
const OIL_WARN_KPA: f64 = 300.0;
const BATTERY_SEVERE_V: f64 = 11.5;
const BATTERY_WARN_V: f64 = 12.0;
const FREQUENCY_SEVERE_HZ: f64 = 0.5;
const FREQUENCY_WARN_HZ: f64 = 0.3;

/// Synthetic service-history fields. These are *seeded backlog state*, drawn
/// independently of the metric series, never derived from it. Kept in one
/// place so the seeding stage stays separate from real derivation.
#[derive(Debug, Clone, Copy)]
pub struct ServiceHistorySeed {
    pub mtbf_hours: f64,
    pub mttr_hours: f64,
    pub next_service_due_hours: f64,
}

impl ServiceHistorySeed {
    pub fn draw(rng: &mut StdRng) -> Self {
        Self {
            mtbf_hours: rng.gen_range(500.0..2000.0),
            mttr_hours: rng.gen_range(2.0..24.0),
            next_service_due_hours: rng.gen_range(-200.0..500.0),
        }
    }
}

/// Aggregates over the trailing 24 h used by the health rule cascade.
#[derive(Debug, Clone, Copy)]
pub struct HealthWindow {
    pub coolant_mean_c: f64,
    pub oil_mean_kpa: f64,
    pub battery_mean_v: f64,
    pub frequency_stddev_hz: f64,
    pub offline: bool,
    pub heartbeat_age_minutes: i64,
}

/// Total additive penalty for a 24 h aggregate window. Tiers are
/// order-independent and at most one tier applies per category.
pub fn health_penalty(policy: &HealthPolicy, window: &HealthWindow) -> f64 {
    let mut penalty = 0.0;
    if window.coolant_mean_c > COOLANT_SEVERE_C {
        penalty += policy.coolant_severe;
    } else if window.coolant_mean_c > COOLANT_WARN_C {
        penalty += policy.coolant_warn;
    }
    if window.oil_mean_kpa < OIL_SEVERE_KPA {
        penalty += policy.oil_severe;
    } else if window.oil_mean_kpa < OIL_WARN_KPA {
        penalty += policy.oil_warn;
    }
    if window.battery_mean_v < BATTERY_SEVERE_V {
        penalty += policy.battery_severe;
    } else if window.battery_mean_v < BATTERY_WARN_V {
        penalty += policy.battery_warn;
    }
    if window.offline {
        penalty += policy.comm_offline;
    } else if window.heartbeat_age_minutes > HEARTBEAT_STALE_MINUTES {
        penalty += policy.comm_stale;
    }
    if window.frequency_stddev_hz > FREQUENCY_SEVERE_HZ {
        penalty += policy.frequency_severe;
    } else if window.frequency_stddev_hz > FREQUENCY_WARN_HZ {
        penalty += policy.frequency_warn;
    }
    penalty
}

/// Compute one KPI per generator over the full available metric window.
/// Units with no samples receive defaulted, neutral KPIs instead of failing.
pub fn compute_kpis(
    fleet: &[Generator],
    samples: &[MetricSample],
    policy: &HealthPolicy,
    window: &SimulationWindow,
    rng: &mut StdRng,
) -> Vec<Kpi> {
    let mut by_unit: HashMap<Uuid, Vec<&MetricSample>> = HashMap::new();
    for sample in samples {
        by_unit.entry(sample.generator_id).or_default().push(sample);
    }

    fleet
        .iter()
        .map(|unit| {
            let unit_samples = by_unit.get(&unit.id).map(Vec::as_slice).unwrap_or(&[]);
            compute_unit_kpi(unit, unit_samples, policy, window, rng)
        })
        .collect()
}

fn compute_unit_kpi(
    unit: &Generator,
    samples: &[&MetricSample],
    policy: &HealthPolicy,
    window: &SimulationWindow,
    rng: &mut StdRng,
) -> Kpi {
    let seed = ServiceHistorySeed::draw(rng);

    if samples.is_empty() {
        return Kpi {
            generator_id: unit.id,
            uptime_pct_7d: 0.0,
            uptime_pct_30d: 0.0,
            avg_load_pct: 0.0,
            utilization_hours_7d: 0.0,
            mtbf_hours: seed.mtbf_hours,
            mttr_hours: seed.mttr_hours,
            est_fuel_rate_lph: 0.25,
            next_service_due_hours: seed.next_service_due_hours,
            maintenance_overdue: seed.next_service_due_hours < 0.0,
            health_score: rng.gen_range(40.0..60.0),
        };
    }

    let uptime_pct_7d = uptime_pct(samples, window, 7);
    let uptime_pct_30d = uptime_pct(samples, window, 30);

    let avg_load_pct = samples.iter().map(|s| s.load_pct).mean();

    let seven_days_ago = window.trailing(7 * 24);
    let utilization_hours_7d = samples
        .iter()
        .filter(|s| s.timestamp > seven_days_ago && s.load_pct > UTILIZATION_LOAD_FLOOR_PCT)
        .count() as f64
        * window.interval_hours();

    // Linear fuel-curve approximation.
    let est_fuel_rate_lph = 0.25 + avg_load_pct / 100.0 * 0.15;

    let health_score = compute_health(unit, samples, policy, window, rng);

    Kpi {
        generator_id: unit.id,
        uptime_pct_7d,
        uptime_pct_30d,
        avg_load_pct,
        utilization_hours_7d,
        mtbf_hours: seed.mtbf_hours,
        mttr_hours: seed.mttr_hours,
        est_fuel_rate_lph,
        next_service_due_hours: seed.next_service_due_hours,
        maintenance_overdue: seed.next_service_due_hours < 0.0,
        health_score,
    }
}

fn uptime_pct(samples: &[&MetricSample], window: &SimulationWindow, days: u32) -> f64 {
    let expected = window.expected_samples(days);
    if expected == 0 {
        return 0.0;
    }
    let cutoff = window.trailing(i64::from(days.min(window.days)) * 24);
    let observed = samples.iter().filter(|s| s.timestamp >= cutoff).count();
    (observed as f64 / expected as f64 * 100.0).min(UPTIME_CAP_PCT)
}

fn compute_health(
    unit: &Generator,
    samples: &[&MetricSample],
    policy: &HealthPolicy,
    window: &SimulationWindow,
    rng: &mut StdRng,
) -> f64 {
    let day_ago = window.trailing(24);
    let recent: Vec<&MetricSample> = samples
        .iter()
        .filter(|s| s.timestamp > day_ago)
        .copied()
        .collect();
    if recent.is_empty() {
        // Nothing observed in the scoring window; report a non-committal
        // mid-range score instead of running the rule cascade on nothing.
        return rng.gen_range(50.0..85.0);
    }

    let frequencies: Vec<f64> = recent.iter().map(|s| s.frequency_hz).collect();
    let frequency_stddev_hz = if frequencies.len() >= 2 {
        (&frequencies).std_dev()
    } else {
        0.0
    };

    let aggregates = HealthWindow {
        coolant_mean_c: recent.iter().map(|s| s.coolant_temp_c).mean(),
        oil_mean_kpa: recent.iter().map(|s| s.oil_pressure_kpa).mean(),
        battery_mean_v: recent.iter().map(|s| s.battery_voltage_v).mean(),
        frequency_stddev_hz,
        offline: unit.status == GeneratorStatus::Offline,
        heartbeat_age_minutes: (window.end - unit.last_heartbeat).num_minutes(),
    };

    let jitter = Normal::new(0.0, HEALTH_JITTER_SIGMA)
        .expect("sigma is positive")
        .sample(rng);
    (100.0 - health_penalty(policy, &aggregates) + jitter).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Protocol;
    use chrono::{Duration, TimeZone, Utc};
    use rand::SeedableRng;

    fn policy() -> HealthPolicy {
        HealthPolicy::default()
    }

    fn healthy_window() -> HealthWindow {
        HealthWindow {
            coolant_mean_c: 80.0,
            oil_mean_kpa: 350.0,
            battery_mean_v: 12.6,
            frequency_stddev_hz: 0.2,
            offline: false,
            heartbeat_age_minutes: 5,
        }
    }

    #[test]
    fn healthy_window_carries_no_penalty() {
        assert_eq!(health_penalty(&policy(), &healthy_window()), 0.0);
    }

    #[test]
    fn only_the_larger_tier_applies_per_category() {
        let mut window = healthy_window();
        window.coolant_mean_c = 92.0;
        assert_eq!(health_penalty(&policy(), &window), 15.0);
        window.coolant_mean_c = 87.0;
        assert_eq!(health_penalty(&policy(), &window), 8.0);
    }

    #[test]
    fn penalties_are_additive_across_categories() {
        let mut window = healthy_window();
        window.coolant_mean_c = 92.0;
        window.oil_mean_kpa = 180.0;
        window.battery_mean_v = 11.0;
        window.offline = true;
        window.frequency_stddev_hz = 0.6;
        assert_eq!(
            health_penalty(&policy(), &window),
            15.0 + 20.0 + 15.0 + 25.0 + 10.0
        );
    }

    #[test]
    fn raising_coolant_mean_never_raises_the_score() {
        let mut cool = healthy_window();
        cool.coolant_mean_c = 80.0;
        let mut hot = healthy_window();
        hot.coolant_mean_c = 96.0;
        assert!(health_penalty(&policy(), &hot) >= health_penalty(&policy(), &cool));
    }

    #[test]
    fn stale_heartbeat_penalised_only_when_not_offline() {
        let mut window = healthy_window();
        window.heartbeat_age_minutes = 90;
        assert_eq!(health_penalty(&policy(), &window), 10.0);
        window.offline = true;
        assert_eq!(health_penalty(&policy(), &window), 25.0);
    }

    fn test_unit(window: &SimulationWindow) -> Generator {
        Generator {
            id: Uuid::from_u128(0xBEEF),
            serial_number: "GF-2021-00002".into(),
            model: "GP-300 Prime".into(),
            protocol: Protocol::Snmp,
            rated_kw: 300.0,
            phases: 3,
            site: "Summit Mine".into(),
            customer: "Cascade Mining Co".into(),
            region: "Southwest".into(),
            latitude: 33.0,
            longitude: -110.0,
            commissioned_at: window.end - Duration::days(900),
            warranty_until: window.end + Duration::days(400),
            status: GeneratorStatus::Running,
            last_heartbeat: window.end - Duration::minutes(2),
        }
    }

    fn flat_sample(unit: &Generator, window: &SimulationWindow, hours_ago: i64) -> MetricSample {
        MetricSample {
            generator_id: unit.id,
            timestamp: window.end - Duration::hours(hours_ago),
            run_hours_total: 1000.0,
            fuel_level_pct: 60.0,
            coolant_temp_c: 80.0,
            oil_pressure_kpa: 350.0,
            battery_voltage_v: 12.6,
            load_kw: 150.0,
            load_pct: 50.0,
            frequency_hz: 60.0,
            power_factor: 0.9,
            ambient_temp_c: 22.0,
        }
    }

    #[test]
    fn unit_without_samples_gets_neutral_kpi() {
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let window = SimulationWindow::new(end, 7, 15).unwrap();
        let unit = test_unit(&window);
        let mut rng = StdRng::seed_from_u64(5);
        let kpis = compute_kpis(&[unit], &[], &policy(), &window, &mut rng);
        assert_eq!(kpis.len(), 1);
        let kpi = &kpis[0];
        assert_eq!(kpi.uptime_pct_7d, 0.0);
        assert_eq!(kpi.avg_load_pct, 0.0);
        assert!((40.0..60.0).contains(&kpi.health_score));
        assert_eq!(kpi.maintenance_overdue, kpi.next_service_due_hours < 0.0);
    }

    #[test]
    fn uptime_is_capped_at_95() {
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let window = SimulationWindow::new(end, 1, 60).unwrap();
        let unit = test_unit(&window);
        // Every expected slot filled.
        let samples: Vec<MetricSample> = (0..24).map(|h| flat_sample(&unit, &window, h)).collect();
        let mut rng = StdRng::seed_from_u64(5);
        let kpis = compute_kpis(&[unit], &samples, &policy(), &window, &mut rng);
        assert_eq!(kpis[0].uptime_pct_7d, 95.0);
        assert!(kpis[0].uptime_pct_30d <= 95.0);
    }

    #[test]
    fn utilization_counts_loaded_recent_samples() {
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let window = SimulationWindow::new(end, 7, 60).unwrap();
        let unit = test_unit(&window);
        let mut samples: Vec<MetricSample> =
            (1..=10).map(|h| flat_sample(&unit, &window, h)).collect();
        // Two idle samples below the load floor.
        for sample in samples.iter_mut().take(2) {
            sample.load_pct = 5.0;
        }
        let mut rng = StdRng::seed_from_u64(5);
        let kpis = compute_kpis(&[unit], &samples, &policy(), &window, &mut rng);
        assert!((kpis[0].utilization_hours_7d - 8.0).abs() < 1e-9);
    }

    #[test]
    fn health_uses_fallback_when_24h_window_is_empty() {
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let window = SimulationWindow::new(end, 7, 60).unwrap();
        let unit = test_unit(&window);
        // All samples older than 24 h.
        let samples: Vec<MetricSample> =
            (30..40).map(|h| flat_sample(&unit, &window, h)).collect();
        let mut rng = StdRng::seed_from_u64(5);
        let kpis = compute_kpis(&[unit], &samples, &policy(), &window, &mut rng);
        assert!((50.0..85.0).contains(&kpis[0].health_score));
    }

    #[test]
    fn overdue_flag_matches_sign_of_service_due() {
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let window = SimulationWindow::new(end, 7, 60).unwrap();
        let fleet: Vec<Generator> = (0..40)
            .map(|i| {
                let mut unit = test_unit(&window);
                unit.id = Uuid::from_u128(i);
                unit
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(77);
        let kpis = compute_kpis(&fleet, &[], &policy(), &window, &mut rng);
        for kpi in &kpis {
            assert_eq!(kpi.maintenance_overdue, kpi.next_service_due_hours < 0.0);
        }
    }
}
