//! Spherical Bessel and Hankel functions
//!
//! ```text
//! j_n(x) = √(π/2x) J_{n+1/2}(x)
//! y_n(x) = √(π/2x) Y_{n+1/2}(x)
//! h_n(x) = j_n(x) + i y_n(x)      (outgoing for exp(ikr) / exp(-iωt))
//! ```
//!
//! All functions return `order` values, n = 0, 1, ..., order-1.

use num_complex::Complex64;

/// Spherical Bessel functions of the first kind j_n(x)
///
/// Miller's downward recurrence `j_{n-1} = (2n+1)/x j_n - j_{n+1}`. Stable for
/// n > x.
///
/// ```
/// use sea_wave::special::spherical_bessel_j;
/// let j = spherical_bessel_j(3, 1.0);
/// assert!((j[0] - 1.0_f64.sin()).abs() < 1e-12);
/// ```
pub fn spherical_bessel_j(order: usize, x: f64) -> Vec<f64> {
    let mut result = vec![0.0; order.max(1)];

    if x.abs() < 1e-8 {
        // leading terms of x^n / (2n+1)!!
        let mut term = 1.0;
        for (n, value) in result.iter_mut().enumerate() {
            if n > 0 {
                term *= x / (2 * n + 1) as f64;
            }
            *value = term;
        }
        result.truncate(order);
        return result;
    }

    let start = order + x.abs() as usize + 20;
    let mut values = vec![0.0; start + 2];
    values[start] = 1e-30;
    for n in (0..start).rev() {
        values[n] = (2 * n + 3) as f64 / x * values[n + 1] - values[n + 2];
        if values[n].abs() > 1e250 {
            // rescale to stay in range; only ratios matter
            for v in values.iter_mut().skip(n) {
                *v *= 1e-250;
            }
        }
    }

    // sum rule Σ (2n+1) j_n² = 1 fixes the magnitude, the closed forms fix the sign
    let norm = values
        .iter()
        .enumerate()
        .map(|(n, v)| (2 * n + 1) as f64 * v * v)
        .sum::<f64>()
        .sqrt();
    let (sin_x, cos_x) = x.sin_cos();
    let j0 = sin_x / x;
    let j1 = sin_x / (x * x) - cos_x / x;
    let reference_sign = if j0.abs() >= j1.abs() {
        j0.signum() * values[0].signum()
    } else {
        j1.signum() * values[1].signum()
    };
    let scale = reference_sign / norm;
    for (n, value) in result.iter_mut().enumerate() {
        *value = values[n] * scale;
    }
    result.truncate(order);
    result
}

/// Spherical Bessel functions of the second kind y_n(x)
///
/// Upward recurrence from y_0 = -cos(x)/x, y_1 = -cos(x)/x² - sin(x)/x.
pub fn spherical_bessel_y(order: usize, x: f64) -> Vec<f64> {
    let mut result = vec![0.0; order];
    if order == 0 {
        return result;
    }
    if x.abs() < 1e-300 {
        result.iter_mut().for_each(|v| *v = f64::NEG_INFINITY);
        return result;
    }

    let (sin_x, cos_x) = x.sin_cos();
    result[0] = -cos_x / x;
    if order > 1 {
        result[1] = -cos_x / (x * x) - sin_x / x;
    }
    for n in 2..order {
        result[n] = (2 * n - 1) as f64 / x * result[n - 1] - result[n - 2];
    }
    result
}

/// Spherical Hankel functions of the first kind h_n(x) = j_n(x) + i y_n(x)
pub fn spherical_hankel_first_kind(order: usize, x: f64) -> Vec<Complex64> {
    let j = spherical_bessel_j(order, x);
    let y = spherical_bessel_y(order, x);
    j.into_iter()
        .zip(y)
        .map(|(jn, yn)| Complex64::new(jn, yn))
        .collect()
}

/// h_n(x) and h_n'(x) for n = 0..order-1
///
/// Uses `h_0' = -h_1` and `h_n' = h_{n-1} - (n+1)/x h_n`.
pub fn spherical_hankel_with_derivative(order: usize, x: f64) -> (Vec<Complex64>, Vec<Complex64>) {
    let h = spherical_hankel_first_kind(order + 1, x);
    let dh = (0..order)
        .map(|n| {
            if n == 0 {
                -h[1]
            } else {
                h[n - 1] - h[n] * ((n + 1) as f64 / x)
            }
        })
        .collect();
    let mut h = h;
    h.truncate(order);
    (h, dh)
}

/// Derivatives j_n'(x) for n = 0..order-1
pub fn spherical_bessel_j_derivative(order: usize, x: f64) -> Vec<f64> {
    let j = spherical_bessel_j(order + 1, x);
    (0..order)
        .map(|n| {
            if n == 0 {
                -j[1]
            } else {
                j[n - 1] - (n + 1) as f64 / x * j[n]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_closed_forms() {
        let x: f64 = 2.3;
        let j = spherical_bessel_j(3, x);
        let y = spherical_bessel_y(3, x);
        let (s, c) = x.sin_cos();

        assert_relative_eq!(j[0], s / x, epsilon = 1e-12);
        assert_relative_eq!(j[1], s / (x * x) - c / x, epsilon = 1e-12);
        assert_relative_eq!(j[2], (3.0 / (x * x) - 1.0) * s / x - 3.0 * c / (x * x), epsilon = 1e-12);
        assert_relative_eq!(y[0], -c / x, epsilon = 1e-12);
        assert_relative_eq!(y[1], -c / (x * x) - s / x, epsilon = 1e-12);
    }

    #[test]
    fn test_hankel_zero_is_outgoing_exponential() {
        let x = 1.7;
        let h = spherical_hankel_first_kind(1, x);
        // h_0(x) = -i e^{ix} / x
        let expected = Complex64::new(0.0, -1.0) * Complex64::new(0.0, x).exp() / x;
        assert_relative_eq!((h[0] - expected).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hankel_derivative_matches_finite_difference() {
        let x = 0.9;
        let step = 1e-6;
        let (_, dh) = spherical_hankel_with_derivative(4, x);
        let plus = spherical_hankel_first_kind(4, x + step);
        let minus = spherical_hankel_first_kind(4, x - step);
        for n in 0..4 {
            let fd = (plus[n] - minus[n]) / (2.0 * step);
            assert_relative_eq!((dh[n] - fd).norm() / fd.norm(), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_small_argument() {
        let j = spherical_bessel_j(3, 1e-10);
        assert_relative_eq!(j[0], 1.0, epsilon = 1e-12);
        assert!(j[2].abs() < 1e-20);
    }

    #[test]
    fn test_bessel_derivative() {
        let x = 1.3;
        let dj = spherical_bessel_j_derivative(2, x);
        let (s, c) = x.sin_cos();
        // j_0' = (x cos x - sin x) / x²
        assert_relative_eq!(dj[0], (x * c - s) / (x * x), epsilon = 1e-12);
    }
}
