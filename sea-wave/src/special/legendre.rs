//! Legendre polynomials and associated Legendre functions

/// Legendre polynomials P_n(x) for n = 0..order-1
///
/// `(n+1) P_{n+1} = (2n+1) x P_n - n P_{n-1}`
///
/// ```
/// use sea_wave::special::legendre_polynomials;
/// let p = legendre_polynomials(3, 0.5);
/// assert!((p[2] + 0.125).abs() < 1e-12);
/// ```
pub fn legendre_polynomials(order: usize, x: f64) -> Vec<f64> {
    let mut p = Vec::with_capacity(order);
    for n in 0..order {
        let value = match n {
            0 => 1.0,
            1 => x,
            _ => {
                let nf = n as f64;
                ((2.0 * nf - 1.0) * x * p[n - 1] - (nf - 1.0) * p[n - 2]) / nf
            }
        };
        p.push(value);
    }
    p
}

/// Single Legendre polynomial P_n(x)
pub fn legendre_p(n: usize, x: f64) -> f64 {
    legendre_polynomials(n + 1, x)[n]
}

/// Associated Legendre functions P_n^m(x), n = m..=n_max, for fixed m ≥ 0
///
/// Includes the Condon–Shortley phase:
/// ```text
/// P_m^m     = (-1)^m (2m-1)!! (1-x²)^{m/2}
/// P_{m+1}^m = x (2m+1) P_m^m
/// P_n^m     = ((2n-1) x P_{n-1}^m - (n+m-1) P_{n-2}^m) / (n-m)
/// ```
/// Returns an empty vector when `m > n_max`.
pub fn associated_legendre(n_max: usize, m: usize, x: f64) -> Vec<f64> {
    if m > n_max {
        return Vec::new();
    }

    let sin_theta = (1.0 - x * x).max(0.0).sqrt();
    let mut pmm = 1.0;
    for i in 1..=m {
        pmm *= -((2 * i - 1) as f64) * sin_theta;
    }

    let mut result = Vec::with_capacity(n_max - m + 1);
    result.push(pmm);
    if n_max > m {
        result.push(x * (2 * m + 1) as f64 * pmm);
    }
    for n in (m + 2)..=n_max {
        let (nf, mf) = (n as f64, m as f64);
        let next = ((2.0 * nf - 1.0) * x * result[n - m - 1] - (nf + mf - 1.0) * result[n - m - 2])
            / (nf - mf);
        result.push(next);
    }
    result
}

/// Spherical harmonic normalisation √((2n+1)/(4π) (n-m)!/(n+m)!)
pub fn harmonic_normalization(n: usize, m: usize) -> f64 {
    let log_ratio: f64 = ((n - m + 1)..=(n + m)).map(|k| -(k as f64).ln()).sum();
    ((2 * n + 1) as f64 / (4.0 * std::f64::consts::PI) * log_ratio.exp()).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_low_order_polynomials() {
        let x = 0.6;
        let p = legendre_polynomials(4, x);
        assert_relative_eq!(p[0], 1.0);
        assert_relative_eq!(p[1], x);
        assert_relative_eq!(p[2], (3.0 * x * x - 1.0) / 2.0, epsilon = 1e-14);
        assert_relative_eq!(p[3], (5.0 * x * x * x - 3.0 * x) / 2.0, epsilon = 1e-14);
        assert_relative_eq!(legendre_p(3, x), p[3]);
    }

    #[test]
    fn test_associated_condon_shortley() {
        let x: f64 = 0.3;
        let s = (1.0 - x * x).sqrt();
        let p1 = associated_legendre(3, 1, x);
        assert_relative_eq!(p1[0], -s, epsilon = 1e-14);
        assert_relative_eq!(p1[1], -3.0 * x * s, epsilon = 1e-14);

        let p2 = associated_legendre(2, 2, x);
        assert_relative_eq!(p2[0], 3.0 * s * s, epsilon = 1e-14);

        assert!(associated_legendre(1, 2, x).is_empty());
    }

    #[test]
    fn test_normalization() {
        use std::f64::consts::PI;
        assert_relative_eq!(harmonic_normalization(0, 0), (1.0 / (4.0 * PI)).sqrt());
        assert_relative_eq!(harmonic_normalization(1, 1), (3.0 / (8.0 * PI)).sqrt(), epsilon = 1e-14);
    }
}
