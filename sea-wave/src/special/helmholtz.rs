//! Helmholtz Green's function and derivatives
//!
//! The 3D free-space Green's function for `exp(-iωt)` fields:
//! ```text
//! G(x, y) = exp(ik|x-y|) / (4π|x-y|)
//! ```
//! These are the kernels of the single-layer and double-layer operators.

use crate::Point;
use num_complex::Complex64;
use std::f64::consts::PI;

/// 3D Helmholtz Green's function G = exp(ikr)/(4πr)
///
/// ```
/// use sea_wave::special::greens_function_3d;
///
/// let g = greens_function_3d(1.0, 2.0);
/// assert!((g.norm() - 1.0 / (4.0 * std::f64::consts::PI)).abs() < 1e-10);
/// ```
#[inline]
pub fn greens_function_3d(r: f64, k: f64) -> Complex64 {
    if r < 1e-15 {
        return Complex64::new(f64::INFINITY, 0.0);
    }
    Complex64::from_polar(1.0 / (4.0 * PI * r), k * r)
}

/// Gradient with respect to the field point, ∇_y G
///
/// ```text
/// ∇_y G = (ik - 1/r) G (y - x)/r
/// ```
pub fn greens_function_gradient_3d(source: &Point, field: &Point, k: f64) -> [Complex64; 3] {
    let d = field.sub(source);
    let r = d.radius();
    if r < 1e-15 {
        let inf = Complex64::new(f64::INFINITY, 0.0);
        return [inf, inf, inf];
    }
    let factor = Complex64::new(-1.0 / r, k) * greens_function_3d(r, k) / r;
    [factor * d.x, factor * d.y, factor * d.z]
}

/// Normal derivative at the field point, ∂G/∂n_y
///
/// ```text
/// ∂G/∂n_y = (ik - 1/r) G (y-x)·n_y / r
/// ```
/// Kernel of the double-layer operator.
#[inline]
pub fn greens_function_normal_derivative_3d(
    source: &Point,
    field: &Point,
    normal: &[f64; 3],
    k: f64,
) -> Complex64 {
    let d = field.sub(source);
    let r = d.radius();
    if r < 1e-15 {
        return Complex64::new(f64::INFINITY, 0.0);
    }
    let r_dot_n = d.x * normal[0] + d.y * normal[1] + d.z * normal[2];
    Complex64::new(-1.0 / r, k) * greens_function_3d(r, k) * (r_dot_n / r)
}

/// G and ∂G/∂n_y together, sharing the exponential
#[inline]
pub fn greens_kernels_3d(
    source: &Point,
    field: &Point,
    normal: &[f64; 3],
    k: f64,
) -> (Complex64, Complex64) {
    let d = field.sub(source);
    let r = d.radius();
    if r < 1e-15 {
        let inf = Complex64::new(f64::INFINITY, 0.0);
        return (inf, inf);
    }
    let g = greens_function_3d(r, k);
    let r_dot_n = d.x * normal[0] + d.y * normal[1] + d.z * normal[2];
    (g, Complex64::new(-1.0 / r, k) * g * (r_dot_n / r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_greens_function_magnitude() {
        let r = 2.0;
        let g = greens_function_3d(r, 1.5);
        assert_relative_eq!(g.norm(), 1.0 / (4.0 * PI * r), epsilon = EPSILON);
    }

    #[test]
    fn test_greens_function_k_zero() {
        let r = 1.5;
        let g = greens_function_3d(r, 0.0);
        assert_relative_eq!(g.re, 1.0 / (4.0 * PI * r), epsilon = EPSILON);
        assert!(g.im.abs() < EPSILON);
    }

    #[test]
    fn test_normal_derivative_tangential() {
        let source = Point::new(0.0, 0.0, 0.0);
        let field = Point::new(1.0, 0.0, 0.0);
        let dg = greens_function_normal_derivative_3d(&source, &field, &[0.0, 1.0, 0.0], 2.0);
        assert!(dg.norm() < EPSILON);
    }

    #[test]
    fn test_normal_derivative_matches_gradient() {
        let source = Point::new(0.1, -0.2, 0.3);
        let field = Point::new(1.0, 0.5, -0.3);
        let n = [0.0, 0.6, 0.8];
        let k = 2.5;

        let grad = greens_function_gradient_3d(&source, &field, k);
        let projected = grad[0] * n[0] + grad[1] * n[1] + grad[2] * n[2];
        let (g, dg) = greens_kernels_3d(&source, &field, &n, k);

        assert!((projected - dg).norm() < EPSILON);
        assert!((g - greens_function_3d(source.distance_to(&field), k)).norm() < EPSILON);
        assert!(
            (dg - greens_function_normal_derivative_3d(&source, &field, &n, k)).norm() < EPSILON
        );
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let source = Point::new(0.0, 0.0, 0.0);
        let field = Point::new(0.7, 0.2, -0.4);
        let k = 3.0;
        let h = 1e-6;
        let grad = greens_function_gradient_3d(&source, &field, k);

        let plus = greens_function_3d(Point::new(0.7 + h, 0.2, -0.4).radius(), k);
        let minus = greens_function_3d(Point::new(0.7 - h, 0.2, -0.4).radius(), k);
        let fd = (plus - minus) / (2.0 * h);
        assert!((grad[0] - fd).norm() < 1e-6);
    }
}
