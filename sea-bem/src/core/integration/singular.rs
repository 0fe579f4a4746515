//! Near-singular integration by triangle splitting and Duffy transform
//!
//! The evaluation point is projected onto the triangle plane and the
//! triangle is split into three sub-triangles sharing the projection.
//! Each sub-triangle is collapsed onto that apex:
//! ```text
//! y(u, v) = x' + u [(v_e - x') + v (v_{e+1} - v_e)],   dA = 2 A_e u du dv
//! ```
//! The factor `u` cancels the 1/r singularity. Signed areas `A_e` keep the
//! split exact when the projection falls outside the triangle.

use super::gauss::gauss_legendre_unit;
use super::QuadPoint;
use crate::core::mesh::element::{cross, dot, sub, Triangle};

/// Sub-triangles thinner than this fraction of the area are skipped
const SLIVER_FRACTION: f64 = 1e-12;

/// Duffy-split rule for a kernel singular at `x`
///
/// Uses an `order × order` Gauss-Legendre rule per sub-triangle.
pub fn duffy_rule(triangle: &Triangle, x: &[f64; 3], order: usize) -> Vec<QuadPoint> {
    let apex = triangle.project(x);
    let gauss = gauss_legendre_unit(order);
    let mut rule = Vec::with_capacity(3 * gauss.len() * gauss.len());

    for e in 0..3 {
        let a = triangle.vertices[e];
        let b = triangle.vertices[(e + 1) % 3];
        let to_a = sub(&a, &apex);
        let edge = sub(&b, &a);
        let signed_area = 0.5 * dot(&cross(&to_a, &sub(&b, &apex)), &triangle.normal);
        if signed_area.abs() <= SLIVER_FRACTION * triangle.area {
            continue;
        }

        for &(u, wu) in &gauss {
            for &(v, wv) in &gauss {
                let point = [
                    apex[0] + u * (to_a[0] + v * edge[0]),
                    apex[1] + u * (to_a[1] + v * edge[1]),
                    apex[2] + u * (to_a[2] + v * edge[2]),
                ];
                rule.push(QuadPoint {
                    point,
                    weight: wu * wv * 2.0 * signed_area * u,
                    shape: triangle.barycentric(&point),
                });
            }
        }
    }
    rule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::element::distance;
    use approx::assert_relative_eq;

    fn triangle() -> Triangle {
        Triangle::new([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], [0, 1, 2], 0).unwrap()
    }

    #[test]
    fn test_duffy_rule_integrates_linear_functions() {
        let t = triangle();
        for x in [[0.25, 0.25, 0.0], [0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [1.5, 1.0, 0.3]] {
            let rule = duffy_rule(&t, &x, 6);
            let area: f64 = rule.iter().map(|q| q.weight).sum();
            assert_relative_eq!(area, 0.5, epsilon = 1e-13);
            let first: f64 = rule.iter().map(|q| q.weight * q.shape[1]).sum();
            assert_relative_eq!(first, 1.0 / 6.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_duffy_rule_weakly_singular() {
        // ∫ 1/r over the unit right triangle from its right-angle vertex
        // is √2 ln(1 + √2)
        let t = triangle();
        let x = [0.0, 0.0, 0.0];
        let integral: f64 = duffy_rule(&t, &x, 8)
            .iter()
            .map(|q| q.weight / distance(&q.point, &x))
            .sum();
        assert_relative_eq!(integral, 2f64.sqrt() * (1.0 + 2f64.sqrt()).ln(), epsilon = 1e-5);
    }
}
