//! Direct solvers

mod lu;

pub use lu::{LuError, LuFactorization, lu_solve};
