//! ---
//! gf_section: "10-cli-tooling"
//! gf_subsection: "module"
//! gf_type: "source"
//! gf_scope: "code"
//! gf_description: "Dataset generator CLI for GenFleet simulations."
//! gf_version: "v0.1.0"
//! gf_owner: "tbd"
//! ---
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use genfleet_common::config::SimConfig;
use genfleet_common::logging::init_tracing;
use genfleet_sim::{generate_dataset, FleetDataset};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Generate a reproducible generator-fleet telemetry dataset",
    long_about = None
)]
struct Cli {
    /// Configuration file (TOML). GENFLEET_CONFIG overrides this path.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of generator units (overrides config)
    #[arg(long)]
    units: Option<usize>,

    /// Simulation window length in days (overrides config)
    #[arg(long)]
    window_days: Option<u32>,

    /// Sampling interval in minutes (overrides config)
    #[arg(long)]
    interval_minutes: Option<u32>,

    /// Random seed for the deterministic generator (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Window end timestamp (RFC 3339). Defaults to the current time.
    #[arg(long, value_name = "TIMESTAMP")]
    reference: Option<DateTime<Utc>>,

    /// Output directory for product files. Use '-' to write one JSON bundle
    /// to stdout.
    #[arg(long, default_value = "dataset")]
    output: PathBuf,

    /// Explicit output format when the target is a directory
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = effective_config(&cli)?;
    init_tracing("genfleet-gen", &config.logging)?;

    let reference = cli.reference.unwrap_or_else(Utc::now);
    let dataset = generate_dataset(&config, reference)?;

    let format = determine_format(&cli.output, cli.format);
    match format {
        OutputFormat::Json => write_json(&cli.output, &dataset)?,
        OutputFormat::Csv => write_csv_products(&cli.output, &dataset)?,
    }

    if cli.output.as_os_str() != "-" {
        eprintln!(
            "generated {} units, {} samples, {} alerts, {} tickets -> {}",
            dataset.fleet.len(),
            dataset.samples.len(),
            dataset.alerts.len(),
            dataset.tickets.len(),
            cli.output.display()
        );
    }

    Ok(())
}

/// Resolve the run configuration: file (when present) plus flag overrides.
/// Validation runs on the merged result so flag overrides fail fast too.
fn effective_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(&[path])?,
        None => {
            if std::env::var(SimConfig::ENV_CONFIG_PATH).is_ok() {
                SimConfig::load(&[] as &[&Path])?
            } else {
                SimConfig::default()
            }
        }
    };
    if let Some(units) = cli.units {
        config.fleet.units = units;
    }
    if let Some(days) = cli.window_days {
        config.window.days = days;
    }
    if let Some(interval) = cli.interval_minutes {
        config.window.interval_minutes = interval;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn determine_format(output: &Path, override_format: Option<OutputFormat>) -> OutputFormat {
    if output.as_os_str() == "-" {
        return OutputFormat::Json;
    }
    override_format.unwrap_or(OutputFormat::Csv)
}

fn write_json(output: &Path, dataset: &FleetDataset) -> Result<()> {
    if output.as_os_str() == "-" {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, dataset)?;
        stdout.write_all(b"\n")?;
        return Ok(());
    }
    std::fs::create_dir_all(output)
        .with_context(|| format!("unable to create output directory {}", output.display()))?;
    let path = output.join("dataset.json");
    let file = File::create(&path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    serde_json::to_writer_pretty(file, dataset)?;
    Ok(())
}

fn write_csv_products(output: &Path, dataset: &FleetDataset) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("unable to create output directory {}", output.display()))?;
    write_csv_file(&output.join("fleet.csv"), &dataset.fleet)?;
    write_csv_file(&output.join("metrics.csv"), &dataset.samples)?;
    write_csv_file(&output.join("kpis.csv"), &dataset.kpis)?;
    write_csv_file(&output.join("alerts.csv"), &dataset.alerts)?;
    write_csv_file(&output.join("tickets.csv"), &dataset.tickets)?;
    Ok(())
}

fn write_csv_file<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_cli() -> Cli {
        Cli {
            config: None,
            units: None,
            window_days: None,
            interval_minutes: None,
            seed: None,
            reference: None,
            output: PathBuf::from("dataset"),
            format: None,
        }
    }

    #[test]
    fn determine_format_defaults_csv_for_directories() {
        assert!(matches!(
            determine_format(Path::new("out"), None),
            OutputFormat::Csv
        ));
    }

    #[test]
    fn determine_format_for_stdout_is_json() {
        assert!(matches!(
            determine_format(Path::new("-"), None),
            OutputFormat::Json
        ));
        assert!(matches!(
            determine_format(Path::new("-"), Some(OutputFormat::Csv)),
            OutputFormat::Json
        ));
    }

    #[test]
    fn flag_overrides_apply_to_default_config() {
        let mut cli = base_cli();
        cli.units = Some(3);
        cli.window_days = Some(2);
        cli.seed = Some(7);
        let config = effective_config(&cli).unwrap();
        assert_eq!(config.fleet.units, 3);
        assert_eq!(config.window.days, 2);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn invalid_overrides_fail_fast() {
        let mut cli = base_cli();
        cli.interval_minutes = Some(0);
        assert!(effective_config(&cli).is_err());
    }

    #[test]
    fn csv_export_writes_all_products() {
        let dir = tempfile::tempdir().unwrap();
        let mut cli = base_cli();
        cli.units = Some(2);
        cli.window_days = Some(1);
        cli.interval_minutes = Some(60);
        let config = effective_config(&cli).unwrap();
        let reference = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let dataset = generate_dataset(&config, reference).unwrap();
        write_csv_products(dir.path(), &dataset).unwrap();
        for name in ["fleet.csv", "metrics.csv", "kpis.csv", "alerts.csv", "tickets.csv"] {
            assert!(dir.path().join(name).exists(), "missing {name}");
        }
    }
}
