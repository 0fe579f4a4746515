//! Session layer: configuration, frequency sweep and results
//!
//! - `session`: mutable simulation description and the sweep
//! - `results`: per-receiver records and per-frequency status
//! - `config`: JSON configuration that builds a session

pub mod config;
pub mod results;
pub mod session;

pub use config::{AirConfig, FrequencyConfig, MeshConfig, SimulationConfig};
pub use results::{FrequencyStatus, PressureSample, ReceiverPressureRecord, SimulationResults};
pub use session::{FailurePolicy, RunOptions, Session};
