//! Gauss-Legendre and triangle quadrature rules
//!
//! Gauss-Legendre nodes come from Newton iteration on P_n, so any order is
//! available. The triangle rule is the 7-point degree-5 rule (Dunavant),
//! built from its closed form.

use std::f64::consts::PI;

/// Quadrature point on the reference triangle: (s, t, weight)
pub type TrianglePoint = (f64, f64, f64);

/// Gauss-Legendre abscissas and weights on [-1, 1]
pub fn gauss_legendre(order: usize) -> (Vec<f64>, Vec<f64>) {
    let n = order.max(1);
    let mut points = vec![0.0; n];
    let mut weights = vec![0.0; n];

    for i in 0..n.div_ceil(2) {
        // Tricomi initial guess
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut derivative = 1.0;
        for _ in 0..100 {
            let (p, dp) = legendre_with_derivative(n, x);
            derivative = dp;
            let dx = p / dp;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }
        let (_, dp) = legendre_with_derivative(n, x);
        if dp.is_finite() {
            derivative = dp;
        }
        let w = 2.0 / ((1.0 - x * x) * derivative * derivative);
        points[i] = -x;
        points[n - 1 - i] = x;
        weights[i] = w;
        weights[n - 1 - i] = w;
    }
    (points, weights)
}

/// P_n(x) and P_n'(x) by the three-term recurrence
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    if n == 0 {
        return (1.0, 0.0);
    }
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * x * p1 - (kf - 1.0) * p0) / kf;
        p0 = p1;
        p1 = p2;
    }
    let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}

/// Gauss-Legendre rule mapped to [0, 1]
pub fn gauss_legendre_unit(order: usize) -> Vec<(f64, f64)> {
    let (x, w) = gauss_legendre(order);
    x.iter().zip(&w).map(|(x, w)| (0.5 * (x + 1.0), 0.5 * w)).collect()
}

/// 7-point degree-5 rule on the reference triangle (0,0), (1,0), (0,1)
///
/// Weights sum to 0.5, the reference triangle area.
pub fn triangle_quadrature_7() -> Vec<TrianglePoint> {
    const AREA_SCALE: f64 = 0.5;
    let sqrt15 = 15f64.sqrt();
    let a = (6.0 - sqrt15) / 21.0;
    let b = (6.0 + sqrt15) / 21.0;
    let wa = (155.0 - sqrt15) / 1200.0;
    let wb = (155.0 + sqrt15) / 1200.0;

    let mut rule = vec![(1.0 / 3.0, 1.0 / 3.0, 9.0 / 40.0)];
    for (c, w) in [(a, wa), (b, wb)] {
        let far = 1.0 - 2.0 * c;
        rule.push((c, c, w));
        rule.push((far, c, w));
        rule.push((c, far, w));
    }
    rule.into_iter().map(|(s, t, w)| (s, t, w * AREA_SCALE)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gauss_legendre_2() {
        let (x, w) = gauss_legendre(2);
        assert_relative_eq!(x[0], -1.0 / 3f64.sqrt(), epsilon = 1e-15);
        assert_relative_eq!(x[1], 1.0 / 3f64.sqrt(), epsilon = 1e-15);
        assert_relative_eq!(w[0], 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_gauss_weights_sum() {
        for order in [1, 3, 5, 8, 16] {
            let (x, w) = gauss_legendre(order);
            assert_eq!(x.len(), order);
            assert_relative_eq!(w.iter().sum::<f64>(), 2.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_gauss_legendre_exactness() {
        // 8 points integrate x^14 exactly
        let (x, w) = gauss_legendre(8);
        let integral: f64 = x.iter().zip(&w).map(|(x, w)| w * x.powi(14)).sum();
        assert_relative_eq!(integral, 2.0 / 15.0, epsilon = 1e-14);
        let unit: f64 = gauss_legendre_unit(8).iter().map(|(x, w)| w * x.powi(3)).sum();
        assert_relative_eq!(unit, 0.25, epsilon = 1e-14);
    }

    #[test]
    fn test_triangle_quadrature() {
        let rule = triangle_quadrature_7();
        assert_eq!(rule.len(), 7);
        let area: f64 = rule.iter().map(|p| p.2).sum();
        assert_relative_eq!(area, 0.5, epsilon = 1e-15);
        // ∫ s² t² = 2!2!/6! = 1/180
        let moment: f64 = rule.iter().map(|(s, t, w)| w * s * s * t * t).sum();
        assert_relative_eq!(moment, 1.0 / 180.0, epsilon = 1e-15);
        // ∫ s^5 = 5!/7! = 1/42
        let fifth: f64 = rule.iter().map(|(s, _, w)| w * s.powi(5)).sum();
        assert_relative_eq!(fifth, 1.0 / 42.0, epsilon = 1e-15);
    }
}
