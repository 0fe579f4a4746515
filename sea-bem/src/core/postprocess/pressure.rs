//! Pressure reconstruction at field points
//!
//! With normals pointing out of the acoustic domain the scattered field is
//!
//! ```text
//! p_scat(x) = ∫_Γ G(x, y) v(y) dy - ∫_Γ ∂G/∂n_y(x, y) p(y) dy
//! ```
//!
//! where `p` and `v` are the boundary pressure and normal derivative. Field
//! points close to a triangle use the Duffy-split rule on it.

use ndarray::Array1;
use num_complex::Complex64;
use sea_wave::special::greens_kernels_3d;
use sea_wave::Point;
use serde::{Deserialize, Serialize};

use crate::core::bem_solver::BoundaryFieldSolution;
use crate::core::constants::REFERENCE_PRESSURE;
use crate::core::integration::{rule_for_point, SINGULAR_ORDER};
use crate::core::mesh::P1Space;
use crate::core::source::Source;

/// Pressure at one field point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldPoint {
    /// Position (m)
    pub position: [f64; 3],
    /// Incident pressure
    pub p_incident: Complex64,
    /// Scattered pressure
    pub p_scattered: Complex64,
    /// Total pressure (incident + scattered)
    pub p_total: Complex64,
}

impl FieldPoint {
    /// Field point from its incident and scattered parts
    pub fn new(position: [f64; 3], p_incident: Complex64, p_scattered: Complex64) -> Self {
        Self {
            position,
            p_incident,
            p_scattered,
            p_total: p_incident + p_scattered,
        }
    }

    /// Total pressure level in dB SPL (re 20 µPa)
    pub fn spl_db(&self) -> f64 {
        spl_db(self.p_total)
    }

    /// |p_total|
    pub fn magnitude(&self) -> f64 {
        self.p_total.norm()
    }

    /// Phase of p_total in radians
    pub fn phase(&self) -> f64 {
        self.p_total.arg()
    }
}

/// Level of a complex pressure amplitude in dB SPL
pub fn spl_db(p: Complex64) -> f64 {
    20.0 * (p.norm() / REFERENCE_PRESSURE).log10()
}

/// Single- and double-layer potentials of P1 densities at `x`
///
/// Returns `(∫ G σ, ∫ ∂G/∂n_y τ)`.
pub fn layer_potentials(
    space: &P1Space,
    sigma: &Array1<Complex64>,
    tau: &Array1<Complex64>,
    x: &[f64; 3],
    k: f64,
) -> (Complex64, Complex64) {
    let zero = Complex64::new(0.0, 0.0);
    let field = Point::from_array(*x);
    let mut single = zero;
    let mut double = zero;

    for triangle in space.mesh().elements() {
        for q in rule_for_point(triangle, x, SINGULAR_ORDER) {
            let (g, dg) = greens_kernels_3d(&field, &Point::from_array(q.point), &triangle.normal, k);
            let s = P1Space::evaluate(sigma, triangle, &q.shape);
            let t = P1Space::evaluate(tau, triangle, &q.shape);
            single += g * s * q.weight;
            double += dg * t * q.weight;
        }
    }
    (single, double)
}

/// Scattered pressure at `x` from a boundary solution
pub fn scattered_pressure(
    space: &P1Space,
    pressure: &Array1<Complex64>,
    velocity: &Array1<Complex64>,
    x: &[f64; 3],
    k: f64,
) -> Complex64 {
    let (single, double) = layer_potentials(space, velocity, pressure, x, k);
    single - double
}

/// Incident, scattered and total pressure at `x` for a solved source
pub fn evaluate_field_point(
    space: &P1Space,
    source: &Source,
    solution: &BoundaryFieldSolution,
    k: f64,
    x: &[f64; 3],
) -> FieldPoint {
    let p_incident = source.pressure(solution.frequency_index, k, &Point::from_array(*x));
    let p_scattered = scattered_pressure(space, &solution.pressure, &solution.velocity, x, k);
    FieldPoint::new(*x, p_incident, p_scattered)
}
