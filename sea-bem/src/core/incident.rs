//! Incident field traces and the boundary excitation
//!
//! The excitation of the scattered-field problem is
//! ```text
//! g = ∂p_inc/∂n - a μ p_inc,   a = i k ρ0 c0
//! ```
//! sampled at the quadrature points of every triangle (μ of the triangle
//! region) and L²-projected onto P1.

use ndarray::Array1;
use num_complex::Complex64;
use sea_wave::Point;

use crate::core::error::Result;
use crate::core::mesh::P1Space;
use crate::core::source::Source;

/// P1 coefficients of the excitation `g`
///
/// `coupling` is `a`, `region_mu` holds μ per region (missing regions are
/// rigid).
pub fn excitation_coefficients(
    space: &P1Space,
    source: &Source,
    fi: usize,
    k: f64,
    coupling: Complex64,
    region_mu: &[Complex64],
) -> Result<Array1<Complex64>> {
    space.project(|triangle, q| {
        let (p, dp) = source.field(fi, k, &Point::from_array(q.point), &triangle.normal);
        let mu = region_mu.get(triangle.region).copied().unwrap_or_default();
        dp - coupling * mu * p
    })
}

/// Incident pressure at every vertex
pub fn incident_trace(space: &P1Space, source: &Source, fi: usize, k: f64) -> Array1<Complex64> {
    space
        .mesh()
        .vertices()
        .iter()
        .map(|v| source.pressure(fi, k, &Point::from_array(*v)))
        .collect()
}
