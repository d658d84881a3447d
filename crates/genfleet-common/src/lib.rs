//! ---
//! gf_section: "01-core-functionality"
//! gf_subsection: "module"
//! gf_type: "source"
//! gf_scope: "code"
//! gf_description: "Shared primitives and utilities for the simulator runtime."
//! gf_version: "v0.1.0"
//! gf_owner: "tbd"
//! ---
//! Core shared primitives for the GenFleet workspace.
//! This crate exposes configuration loading and tracing bootstrap
//! utilities consumed across the workspace.

pub mod config;
pub mod logging;

pub use config::{
    AlertPolicy, FleetConfig, HealthPolicy, LoadedSimConfig, LoggingConfig, SimConfig, StatusMix,
    WindowConfig,
};
pub use logging::{init_tracing, LogFormat};
