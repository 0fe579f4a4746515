//! Frequency-domain boundary element core
//!
//! ## Architecture
//!
//! - `air`, `frequency`: ambient air and the frequency grid
//! - `material`: admittance models per surface region
//! - `source`, `receiver`: excitation and observation points
//! - `mesh`: triangle surface and the P1 space on it
//! - `integration`: regular and Duffy-split quadrature
//! - `assembly`: Galerkin layer operators and the system operator
//! - `incident`: boundary excitation
//! - `bem_solver`: per-frequency GMRES solve
//! - `postprocess`: pressure at field points
//! - `parallel`: rayon helpers with sequential fallbacks

pub mod air;
pub mod assembly;
pub mod bem_solver;
pub mod constants;
pub mod error;
pub mod frequency;
pub mod incident;
pub mod integration;
pub mod material;
pub mod mesh;
pub mod parallel;
pub mod postprocess;
pub mod receiver;
pub mod source;

pub use air::AirProperties;
pub use bem_solver::{BemSolver, BoundaryFieldSolution, FrequencySystem};
pub use error::{BemError, Result};
pub use frequency::FrequencyGrid;
pub use material::{MaterialBoundaryCondition, MaterialKind};
pub use mesh::{P1Space, SurfaceMesh, Triangle};
pub use postprocess::FieldPoint;
pub use receiver::{BinauralDescriptor, Receiver, ReceiverKind};
pub use source::{
    DirectionalSpec, DirectivityDescriptor, GridPolicy, MonopoleSpec, MonopoleStrength, Source, SourceSpec,
};
