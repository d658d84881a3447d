//! ---
//! gf_section: "01-core-functionality"
//! gf_subsection: "module"
//! gf_type: "source"
//! gf_scope: "code"
//! gf_description: "Shared primitives and utilities for the simulator runtime."
//! gf_version: "v0.1.0"
//! gf_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LogFormat;

fn default_units() -> usize {
    25
}

fn default_window_days() -> u32 {
    30
}

fn default_interval_minutes() -> u32 {
    15
}

fn default_seed() -> u64 {
    0xF1EE7u64
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

/// Primary configuration object for a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub alerts: AlertPolicy,
    #[serde(default)]
    pub health: HealthPolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where a [`SimConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedSimConfig {
    pub config: SimConfig,
    pub source: PathBuf,
}

impl SimConfig {
    pub const ENV_CONFIG_PATH: &str = "GENFLEET_CONFIG";

    /// Load configuration from disk, respecting the `GENFLEET_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedSimConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedSimConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedSimConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<SimConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants. Invalid generation parameters fail
    /// here, before any generation begins.
    pub fn validate(&self) -> Result<()> {
        if self.fleet.units == 0 {
            return Err(anyhow!("fleet must contain at least one unit"));
        }
        if self.window.days == 0 {
            return Err(anyhow!("simulation window must span at least one day"));
        }
        if self.window.interval_minutes == 0 {
            return Err(anyhow!("sampling interval must be greater than zero"));
        }
        self.fleet.status_mix.validate()?;
        self.alerts.validate()?;
        self.health.validate()?;
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fleet: FleetConfig::default(),
            window: WindowConfig::default(),
            seed: default_seed(),
            alerts: AlertPolicy::default(),
            health: HealthPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl std::str::FromStr for SimConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: SimConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Fleet roster parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default = "default_units")]
    pub units: usize,
    #[serde(default)]
    pub status_mix: StatusMix,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            units: default_units(),
            status_mix: StatusMix::default(),
        }
    }
}

/// Categorical distribution of operational statuses across the fleet.
///
/// The weights are tunable constants, not derived quantities; the defaults
/// reflect a typical installed base skewed towards running units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusMix {
    pub running: f64,
    pub standby: f64,
    pub offline: f64,
    pub maintenance: f64,
}

impl StatusMix {
    /// Weights in the fixed order running, standby, offline, maintenance.
    pub fn weights(&self) -> [f64; 4] {
        [self.running, self.standby, self.offline, self.maintenance]
    }

    pub fn validate(&self) -> Result<()> {
        let total: f64 = self.weights().iter().sum();
        if self.weights().iter().any(|w| *w < 0.0) {
            return Err(anyhow!("status mix weights must be non-negative"));
        }
        if (total - 1.0).abs() > 1e-6 {
            return Err(anyhow!("status mix weights must sum to 1.0, got {total}"));
        }
        Ok(())
    }
}

impl Default for StatusMix {
    fn default() -> Self {
        Self {
            running: 0.65,
            standby: 0.20,
            offline: 0.10,
            maintenance: 0.05,
        }
    }
}

/// Simulation window parameters: a trailing window of `days`, sampled every
/// `interval_minutes`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_days")]
    pub days: u32,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            days: default_window_days(),
            interval_minutes: default_interval_minutes(),
        }
    }
}

/// Per-rule emission probabilities for the alert engine.
///
/// Rules fire on every qualifying sample but are down-sampled stochastically
/// so a sustained breach does not produce one alert per interval. The
/// defaults are behavioural constants; override with care.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub fuel_low_emit: f64,
    pub coolant_high_emit: f64,
    pub oil_pressure_low_emit: f64,
    pub battery_low_emit: f64,
    pub overload_emit: f64,
}

impl AlertPolicy {
    pub fn validate(&self) -> Result<()> {
        for (rule, p) in [
            ("fuel_low", self.fuel_low_emit),
            ("coolant_high", self.coolant_high_emit),
            ("oil_pressure_low", self.oil_pressure_low_emit),
            ("battery_low", self.battery_low_emit),
            ("overload", self.overload_emit),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(anyhow!(
                    "emission probability for {rule} must be within [0, 1], got {p}"
                ));
            }
        }
        Ok(())
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            fuel_low_emit: 0.30,
            coolant_high_emit: 0.40,
            oil_pressure_low_emit: 0.40,
            battery_low_emit: 0.30,
            overload_emit: 0.20,
        }
    }
}

/// Penalty weights for the composite health score.
///
/// Each category contributes at most one tier; the severe tier supersedes
/// the warning tier within a category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthPolicy {
    pub coolant_severe: f64,
    pub coolant_warn: f64,
    pub oil_severe: f64,
    pub oil_warn: f64,
    pub battery_severe: f64,
    pub battery_warn: f64,
    pub comm_offline: f64,
    pub comm_stale: f64,
    pub frequency_severe: f64,
    pub frequency_warn: f64,
}

impl HealthPolicy {
    pub fn validate(&self) -> Result<()> {
        let weights = [
            self.coolant_severe,
            self.coolant_warn,
            self.oil_severe,
            self.oil_warn,
            self.battery_severe,
            self.battery_warn,
            self.comm_offline,
            self.comm_stale,
            self.frequency_severe,
            self.frequency_warn,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(anyhow!("health penalty weights must be non-negative"));
        }
        Ok(())
    }
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            coolant_severe: 15.0,
            coolant_warn: 8.0,
            oil_severe: 20.0,
            oil_warn: 10.0,
            battery_severe: 15.0,
            battery_warn: 8.0,
            comm_offline: 25.0,
            comm_stale: 10.0,
            frequency_severe: 10.0,
            frequency_warn: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}
