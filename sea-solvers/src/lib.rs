//! Linear solvers for the sea boundary element workspace
//!
//! - **Iterative**: restarted GMRES for the dense, non-Hermitian boundary systems
//! - **Direct**: LU with partial pivoting, factorised once and reused
//! - **Sparse**: CSR storage for mass-type operators
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use sea_solvers::{GmresConfig, gmres};
//!
//! let a = array![[4.0, 1.0], [1.0, 3.0]];
//! let b = array![1.0, 2.0];
//! let solution = gmres(&a, &b, &GmresConfig::default());
//! assert!(solution.converged);
//! ```

pub mod blas_helpers;
pub mod direct;
pub mod iterative;
pub mod sparse;
pub mod traits;

pub use direct::{LuError, LuFactorization, lu_solve};
pub use iterative::{GmresConfig, GmresSolution, gmres, gmres_with_guess};
pub use sparse::CsrMatrix;
pub use traits::{ComplexField, LinearOperator};
