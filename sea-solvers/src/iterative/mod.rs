//! Iterative Krylov solvers

mod gmres;

pub use gmres::{GmresConfig, GmresSolution, gmres, gmres_with_guess};
