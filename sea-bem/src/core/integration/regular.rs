//! Regular integration over well-separated triangles

use super::gauss::{TrianglePoint, triangle_quadrature_7};
use super::singular::duffy_rule;
use super::QuadPoint;
use crate::core::constants::NEAR_FIELD_FACTOR;
use crate::core::mesh::element::{shape_functions, Triangle};

/// Map a reference rule onto `triangle`
pub fn mapped_rule(triangle: &Triangle, reference: &[TrianglePoint]) -> Vec<QuadPoint> {
    let jacobian = 2.0 * triangle.area;
    reference
        .iter()
        .map(|&(s, t, w)| QuadPoint {
            point: triangle.point_at(s, t),
            weight: w * jacobian,
            shape: shape_functions(s, t),
        })
        .collect()
}

/// 7-point rule on `triangle`
pub fn regular_rule(triangle: &Triangle) -> Vec<QuadPoint> {
    mapped_rule(triangle, &triangle_quadrature_7())
}

/// Rule for integrating a kernel singular at `x` over `triangle`
///
/// Duffy-split when `x` is within [`NEAR_FIELD_FACTOR`] diameters of the
/// triangle, the 7-point rule otherwise.
pub fn rule_for_point(triangle: &Triangle, x: &[f64; 3], order: usize) -> Vec<QuadPoint> {
    if triangle.is_near(x, NEAR_FIELD_FACTOR) {
        duffy_rule(triangle, x, order)
    } else {
        regular_rule(triangle)
    }
}
