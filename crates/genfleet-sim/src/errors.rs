//! ---
//! gf_section: "11-simulation"
//! gf_subsection: "module"
//! gf_type: "source"
//! gf_scope: "code"
//! gf_description: "Error taxonomy for the fleet simulation engine."
//! gf_version: "v0.1.0"
//! gf_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Invalid generation parameters fail fast before any generation begins;
/// sparse or empty series are handled locally by the stages and never
/// surface here.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("fleet must contain at least one unit")]
    EmptyFleet,
    #[error("simulation window must span at least one day, got {0}")]
    WindowTooShort(u32),
    #[error("sampling interval must be greater than zero")]
    ZeroInterval,
    #[error("status mix weights do not form a valid distribution")]
    InvalidStatusMix,
}
