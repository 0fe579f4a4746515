//! Boundary operator assembly
//!
//! - [`galerkin`]: dense single- and double-layer matrices
//! - [`operator`]: the matrix-free system operator built from them

pub mod galerkin;
pub mod operator;

pub use galerkin::{assemble_layer_operators, LayerOperators};
pub use operator::BoundaryOperator;
