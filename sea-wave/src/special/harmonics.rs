//! Complex spherical harmonics, Wigner rotations and outgoing multipole fields
//!
//! Conventions:
//! ```text
//! Y_n^m(θ, φ)  = N_nm P_n^m(cos θ) e^{imφ}          (Condon–Shortley phase)
//! Y_n^{-m}     = (-1)^m conj(Y_n^m)
//! p(x)         = Σ b_nm h_n(k r) Y_n^m(θ, φ)         (outgoing field)
//! D^n_{m'm}    = e^{-im'α} d^n_{m'm}(β) e^{-imγ}     (R = Rz(α) Ry(β) Rz(γ))
//! ```
//! Coefficients are stored flat with [`harmonic_index`]. Rotating the
//! coefficients with [`rotation_matrix`] gives the field `p(R⁻¹ x)`.

use super::legendre::{associated_legendre, harmonic_normalization};
use super::spherical::spherical_hankel_with_derivative;
use ndarray::Array2;
use num_complex::Complex64;

/// Angles closer than this to a pole are pulled back for the cot θ term
const POLE_EPS: f64 = 1e-9;

/// Number of coefficients up to and including `order`
#[inline]
pub fn harmonic_count(order: usize) -> usize {
    (order + 1) * (order + 1)
}

/// Flat index of (n, m), `-n ≤ m ≤ n`
#[inline]
pub fn harmonic_index(n: usize, m: i64) -> usize {
    ((n * n + n) as i64 + m) as usize
}

/// Y_n^m(θ, φ) for every n ≤ order
pub fn spherical_harmonics(order: usize, theta: f64, phi: f64) -> Vec<Complex64> {
    let mut y = vec![Complex64::new(0.0, 0.0); harmonic_count(order)];
    let x = theta.cos();

    for m in 0..=order {
        let phase = Complex64::from_polar(1.0, m as f64 * phi);
        let parity = if m % 2 == 0 { 1.0 } else { -1.0 };
        for (offset, p) in associated_legendre(order, m, x).into_iter().enumerate() {
            let n = m + offset;
            let value = phase * (harmonic_normalization(n, m) * p);
            y[harmonic_index(n, m as i64)] = value;
            if m > 0 {
                y[harmonic_index(n, -(m as i64))] = value.conj() * parity;
            }
        }
    }
    y
}

/// Y_n^m and ∂Y_n^m/∂θ
///
/// `∂Y_n^m/∂θ = m cot θ Y_n^m + √((n-m)(n+m+1)) e^{-iφ} Y_n^{m+1}`
pub fn spherical_harmonics_with_theta_derivative(
    order: usize,
    theta: f64,
    phi: f64,
) -> (Vec<Complex64>, Vec<Complex64>) {
    let theta = theta.clamp(POLE_EPS, std::f64::consts::PI - POLE_EPS);
    let y = spherical_harmonics(order, theta, phi);
    let cot = theta.cos() / theta.sin();
    let e_minus = Complex64::from_polar(1.0, -phi);

    let mut dy = vec![Complex64::new(0.0, 0.0); y.len()];
    for n in 0..=order {
        let ni = n as i64;
        for m in -ni..=ni {
            let mut value = y[harmonic_index(n, m)] * (m as f64 * cot);
            if m < ni {
                let ladder = (((ni - m) * (ni + m + 1)) as f64).sqrt();
                value += e_minus * y[harmonic_index(n, m + 1)] * ladder;
            }
            dy[harmonic_index(n, m)] = value;
        }
    }
    (y, dy)
}

/// Wigner small-d matrix d^n_{m'm}(β), indexed `[m' + n, m + n]`
pub fn wigner_small_d(n: usize, beta: f64) -> Array2<f64> {
    let size = 2 * n + 1;
    let factorial: Vec<f64> = std::iter::once(1.0)
        .chain((1..=2 * n).scan(1.0, |acc, k| {
            *acc *= k as f64;
            Some(*acc)
        }))
        .collect();
    let (sin_half, cos_half) = (beta / 2.0).sin_cos();
    let ni = n as i64;

    let mut d = Array2::zeros((size, size));
    for mp in -ni..=ni {
        for m in -ni..=ni {
            let prefactor = (factorial[(ni + mp) as usize]
                * factorial[(ni - mp) as usize]
                * factorial[(ni + m) as usize]
                * factorial[(ni - m) as usize])
                .sqrt();
            let s_min = (m - mp).max(0);
            let s_max = (ni + m).min(ni - mp);
            let mut sum = 0.0;
            for s in s_min..=s_max {
                let sign = if (mp - m + s) % 2 == 0 { 1.0 } else { -1.0 };
                let denom = factorial[(ni + m - s) as usize]
                    * factorial[s as usize]
                    * factorial[(mp - m + s) as usize]
                    * factorial[(ni - mp - s) as usize];
                sum += sign / denom
                    * cos_half.powi((2 * ni + m - mp - 2 * s) as i32)
                    * sin_half.powi((mp - m + 2 * s) as i32);
            }
            d[[(mp + ni) as usize, (m + ni) as usize]] = prefactor * sum;
        }
    }
    d
}

/// Block-diagonal Wigner D matrix for all degrees up to `order`
///
/// `b' = D b` are the coefficients of the field rotated by
/// `R = Rz(α) Ry(β) Rz(γ)`.
pub fn rotation_matrix(order: usize, alpha: f64, beta: f64, gamma: f64) -> Array2<Complex64> {
    let count = harmonic_count(order);
    let mut rot = Array2::from_elem((count, count), Complex64::new(0.0, 0.0));
    for n in 0..=order {
        let d = wigner_small_d(n, beta);
        let ni = n as i64;
        for mp in -ni..=ni {
            for m in -ni..=ni {
                let phase = Complex64::from_polar(1.0, -(mp as f64) * alpha - (m as f64) * gamma);
                rot[[harmonic_index(n, mp), harmonic_index(n, m)]] =
                    phase * d[[(mp + ni) as usize, (m + ni) as usize]];
            }
        }
    }
    rot
}

/// Spherical angles (r, θ, φ) of a Cartesian vector
#[inline]
pub fn to_spherical(v: [f64; 3]) -> (f64, f64, f64) {
    let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if r == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let theta = (v[2] / r).clamp(-1.0, 1.0).acos();
    let phi = v[1].atan2(v[0]);
    (r, theta, phi)
}

/// Outgoing multipole field and its derivative along `normal`
///
/// `offset` is the evaluation point relative to the expansion centre.
/// Returns `(p, ∇p · normal)`; both are zero at the centre itself.
pub fn outgoing_field(
    k: f64,
    coefficients: &[Complex64],
    order: usize,
    offset: [f64; 3],
    normal: [f64; 3],
) -> (Complex64, Complex64) {
    let zero = Complex64::new(0.0, 0.0);
    let (r, theta, phi) = to_spherical(offset);
    if r == 0.0 {
        return (zero, zero);
    }

    let theta = theta.clamp(POLE_EPS, std::f64::consts::PI - POLE_EPS);
    let (h, dh) = spherical_hankel_with_derivative(order + 1, k * r);
    let (y, dy) = spherical_harmonics_with_theta_derivative(order, theta, phi);

    let mut value = zero;
    let mut d_r = zero;
    let mut d_theta = zero;
    let mut d_phi = zero;
    for n in 0..=order {
        let ni = n as i64;
        for m in -ni..=ni {
            let idx = harmonic_index(n, m);
            let b = match coefficients.get(idx) {
                Some(b) => *b,
                None => continue,
            };
            value += b * h[n] * y[idx];
            d_r += b * k * dh[n] * y[idx];
            d_theta += b * h[n] * dy[idx];
            d_phi += b * h[n] * y[idx] * Complex64::new(0.0, m as f64);
        }
    }

    let (sin_t, cos_t) = theta.sin_cos();
    let (sin_p, cos_p) = phi.sin_cos();
    let e_r = [sin_t * cos_p, sin_t * sin_p, cos_t];
    let e_theta = [cos_t * cos_p, cos_t * sin_p, -sin_t];
    let e_phi = [-sin_p, cos_p, 0.0];
    let dot = |a: [f64; 3]| a[0] * normal[0] + a[1] * normal[1] + a[2] * normal[2];

    let derivative =
        d_r * dot(e_r) + d_theta * (dot(e_theta) / r) + d_phi * (dot(e_phi) / (r * sin_t));
    (value, derivative)
}

/// Outgoing multipole field value only
pub fn outgoing_pressure(k: f64, coefficients: &[Complex64], order: usize, offset: [f64; 3]) -> Complex64 {
    outgoing_field(k, coefficients, order, offset, [0.0, 0.0, 0.0]).0
}
