//! # sea-bem: frequency-domain boundary elements for room and scattering acoustics
//!
//! Solves the Helmholtz equation on a triangulated surface with impedance
//! boundaries per region, monopole or multipole sources and point
//! receivers.
//!
//! ## Features
//!
//! - Galerkin P1 discretisation with singular quadrature and GMRES
//! - Material models from tables, absorption data and absorber layouts
//! - Parallel frequency sweep and assembly with Rayon (`native` feature)
//! - JSON configuration and results
//!
//! ```no_run
//! use sea_bem::simulation::SimulationConfig;
//!
//! let config = SimulationConfig::from_file("room.json").unwrap();
//! let results = config.to_session().unwrap().run(&config.solver).unwrap();
//! println!("{:?}", results.receivers[0].spl_db());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

pub mod core;
pub mod simulation;
pub mod testing;

pub use sea_wave::analytical;
pub use crate::core::{BemError, Result};
pub use simulation::{RunOptions, Session, SimulationConfig, SimulationResults};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (set during build)
pub const GIT_HASH: &str = env!("GIT_HASH");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
