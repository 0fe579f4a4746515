//! Numerical integration over flat triangles
//!
//! - [`gauss`]: Gauss-Legendre and 7-point triangle rules
//! - [`regular`]: mapped rules for well-separated pairs
//! - [`singular`]: Duffy-split rules for coincident and nearby pairs

pub mod gauss;
pub mod regular;
pub mod singular;

pub use gauss::{gauss_legendre, gauss_legendre_unit, triangle_quadrature_7};
pub use regular::{mapped_rule, regular_rule, rule_for_point};
pub use singular::duffy_rule;

/// Gauss points per direction in the Duffy-split rules for field points
pub const SINGULAR_ORDER: usize = 8;

/// Gauss points per direction for the inner integral of near Galerkin pairs
///
/// Edge-adjacent pairs put outer quadrature points close to the shared edge,
/// where the double-layer kernel needs the finer rule.
pub const NEAR_PAIR_ORDER: usize = 16;

/// Quadrature point on a physical triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadPoint {
    /// Global coordinates
    pub point: [f64; 3],
    /// Weight including the surface Jacobian
    pub weight: f64,
    /// Linear shape functions of the triangle at `point`
    pub shape: [f64; 3],
}
