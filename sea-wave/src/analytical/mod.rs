//! Analytical reference solutions for validating the boundary element solver
//!
//! - Free-field monopole and its normal derivative
//! - Rigid and locally reacting spheres in a plane wave (modal series)
//! - Rigid sphere, low-frequency Rayleigh limit (ka ≪ 1)
//!
//! Time convention `exp(-iωt)`, outgoing waves `exp(ikr)`.

use crate::special::{
    legendre_p, spherical_bessel_j, spherical_bessel_j_derivative, spherical_hankel_first_kind,
    spherical_hankel_with_derivative,
};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Point in 3D space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    /// x-coordinate
    pub x: f64,
    /// y-coordinate
    pub y: f64,
    /// z-coordinate
    pub z: f64,
}

impl Point {
    /// Create a point
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// From an `[x, y, z]` array
    pub const fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    /// As an `[x, y, z]` array
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Spherical coordinates (r, θ, φ), θ from the z-axis
    pub fn from_spherical(r: f64, theta: f64, phi: f64) -> Self {
        Self::new(
            r * theta.sin() * phi.cos(),
            r * theta.sin() * phi.sin(),
            r * theta.cos(),
        )
    }

    /// Component-wise difference `self - other`
    pub fn sub(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Distance from origin
    pub fn radius(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        self.sub(other).radius()
    }
}

/// Sampled analytical field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticalSolution {
    /// Short description
    pub name: String,
    /// Evaluation points
    pub positions: Vec<Point>,
    /// Complex pressure at each point
    pub pressure: Vec<Complex64>,
    /// Wavenumber
    pub wave_number: f64,
}

impl AnalyticalSolution {
    /// Relative L2 error of `values` against this solution
    pub fn relative_l2_error(&self, values: &[Complex64]) -> f64 {
        let err: f64 = self
            .pressure
            .iter()
            .zip(values)
            .map(|(a, b)| (a - b).norm_sqr())
            .sum::<f64>()
            .sqrt();
        let norm: f64 = self.pressure.iter().map(|p| p.norm_sqr()).sum::<f64>().sqrt();
        if norm < 1e-15 { err } else { err / norm }
    }
}

/// Free-field monopole `q exp(ikr)/(4πr)`
pub fn point_source_pressure(strength: Complex64, source: &Point, field: &Point, k: f64) -> Complex64 {
    let r = source.distance_to(field);
    strength * Complex64::from_polar(1.0 / (4.0 * PI * r), k * r)
}

/// Normal derivative of the free-field monopole at `field`
///
/// `∂p/∂n = p (ikr - 1)/r² (x - x_s)·n`
pub fn point_source_normal_derivative(
    strength: Complex64,
    source: &Point,
    field: &Point,
    normal: &[f64; 3],
    k: f64,
) -> Complex64 {
    let d = field.sub(source);
    let r = d.radius();
    let p = point_source_pressure(strength, source, field, k);
    let d_dot_n = d.x * normal[0] + d.y * normal[1] + d.z * normal[2];
    p * Complex64::new(-1.0, k * r) / (r * r) * d_dot_n
}

/// Scattering coefficients `a_n = j_n'(ka) / h_n'(ka)` of a rigid sphere
pub fn rigid_sphere_coefficients(ka: f64, num_terms: usize) -> Vec<Complex64> {
    admittance_sphere_coefficients(ka, Complex64::new(0.0, 0.0), num_terms)
}

/// Scattering coefficients of a locally reacting sphere
///
/// ```text
/// aₙ = (jₙ'(ka) + iβ jₙ(ka)) / (hₙ'(ka) + iβ hₙ(ka))
/// ```
/// from `∂p/∂r + i k β p = 0` on the surface. `β` is the specific admittance
/// `ρc Y` in the `exp(-iωt)` convention, positive real part for an
/// absorbing surface; `β = 0` is rigid.
pub fn admittance_sphere_coefficients(ka: f64, beta: Complex64, num_terms: usize) -> Vec<Complex64> {
    let j = spherical_bessel_j(num_terms, ka);
    let dj = spherical_bessel_j_derivative(num_terms, ka);
    let (h, dh) = spherical_hankel_with_derivative(num_terms, ka);
    let ib = Complex64::i() * beta;
    (0..num_terms)
        .map(|n| (dj[n] + ib * j[n]) / (dh[n] + ib * h[n]))
        .collect()
}

/// Field scattered by a rigid sphere of radius `radius` from a unit plane
/// wave travelling along +z
///
/// ```text
/// p_s(r, θ) = -Σₙ (2n+1) iⁿ aₙ hₙ(kr) Pₙ(cos θ)
/// ```
pub fn rigid_sphere_scattered(k: f64, radius: f64, r: f64, theta: f64, num_terms: usize) -> Complex64 {
    admittance_sphere_scattered(k, radius, Complex64::new(0.0, 0.0), r, theta, num_terms)
}

/// Field scattered by a sphere of specific admittance `beta`, see
/// [`admittance_sphere_coefficients`]
pub fn admittance_sphere_scattered(
    k: f64,
    radius: f64,
    beta: Complex64,
    r: f64,
    theta: f64,
    num_terms: usize,
) -> Complex64 {
    let coefficients = admittance_sphere_coefficients(k * radius, beta, num_terms);
    let h = spherical_hankel_first_kind(num_terms, k * r);
    let x = theta.cos();

    coefficients
        .iter()
        .zip(&h)
        .enumerate()
        .map(|(n, (a, hn))| {
            let i_pow = Complex64::i().powu(n as u32);
            -((2 * n + 1) as f64) * i_pow * a * hn * legendre_p(n, x)
        })
        .sum()
}

/// Total field (incident + scattered) around a rigid sphere on a grid of
/// radii and polar angles
pub fn sphere_scattering_3d(
    k: f64,
    radius: f64,
    num_terms: usize,
    r_points: &[f64],
    theta_points: &[f64],
) -> AnalyticalSolution {
    let mut solution =
        admittance_sphere_scattering_3d(k, radius, Complex64::new(0.0, 0.0), num_terms, r_points, theta_points);
    solution.name = format!("rigid sphere (ka={:.2})", k * radius);
    solution
}

/// Total field around a sphere of specific admittance `beta`
pub fn admittance_sphere_scattering_3d(
    k: f64,
    radius: f64,
    beta: Complex64,
    num_terms: usize,
    r_points: &[f64],
    theta_points: &[f64],
) -> AnalyticalSolution {
    let mut positions = Vec::with_capacity(r_points.len() * theta_points.len());
    let mut pressure = Vec::with_capacity(positions.capacity());

    for &r in r_points {
        let j = spherical_bessel_j(num_terms, k * r);
        for &theta in theta_points {
            let x = theta.cos();
            let incident: Complex64 = j
                .iter()
                .enumerate()
                .map(|(n, jn)| (2 * n + 1) as f64 * Complex64::i().powu(n as u32) * jn * legendre_p(n, x))
                .sum();
            positions.push(Point::from_spherical(r, theta, 0.0));
            pressure.push(incident + admittance_sphere_scattered(k, radius, beta, r, theta, num_terms));
        }
    }

    AnalyticalSolution {
        name: format!("sphere (ka={:.2}, β={beta})", k * radius),
        positions,
        pressure,
        wave_number: k,
    }
}

/// Low-frequency (Rayleigh) field scattered by a rigid sphere
///
/// ```text
/// p_s = p0 (ka)³ [-(i/3) h₀(kR) - ½ h₁(kR) cos θ]
/// ```
/// `p0` is the incident amplitude at the sphere centre, θ is measured from
/// the direction of propagation.
pub fn rigid_sphere_rayleigh(p0: Complex64, k: f64, radius: f64, r: f64, theta: f64) -> Complex64 {
    let ka3 = (k * radius).powi(3);
    let h = spherical_hankel_first_kind(2, k * r);
    p0 * ka3 * (Complex64::new(0.0, -1.0 / 3.0) * h[0] - 0.5 * h[1] * theta.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_helpers() {
        let p = Point::from_spherical(2.0, PI / 2.0, 0.0);
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(Point::new(1.0, 0.0, 0.0).distance_to(&Point::new(4.0, 4.0, 0.0)), 5.0);
    }

    #[test]
    fn test_monopole_derivative_matches_finite_difference() {
        let q = Complex64::new(0.7, -0.2);
        let src = Point::new(0.0, 0.0, 0.0);
        let x = Point::new(0.4, 0.3, -0.9);
        let n = [0.0, 0.6, -0.8];
        let k = 4.0;
        let h = 1e-6;

        let plus = point_source_pressure(q, &src, &Point::new(x.x, x.y + h * n[1], x.z + h * n[2]), k);
        let minus = point_source_pressure(q, &src, &Point::new(x.x, x.y - h * n[1], x.z - h * n[2]), k);
        let fd = (plus - minus) / (2.0 * h);
        let dp = point_source_normal_derivative(q, &src, &x, &n, k);
        assert!((dp - fd).norm() < 1e-6 * fd.norm().max(1.0));
    }

    #[test]
    fn test_rayleigh_limit_matches_series() {
        let (k, a, r) = (0.05, 1.0, 3.0);
        for theta in [0.0, 0.8, PI / 2.0, PI] {
            let series = rigid_sphere_scattered(k, a, r, theta, 12);
            let rayleigh = rigid_sphere_rayleigh(Complex64::new(1.0, 0.0), k, a, r, theta);
            assert!((series - rayleigh).norm() / series.norm() < 0.02);
        }
    }

    #[test]
    fn test_rigid_surface_has_no_normal_velocity() {
        // ∂p/∂r = 0 at r = a
        let (k, a) = (1.3, 1.0);
        let total = |r: f64| sphere_scattering_3d(k, a, 25, &[r], &[0.6]).pressure[0];
        let h = 1e-5;
        let derivative = (total(a + h) - total(a - h)) / (2.0 * h);
        assert!(derivative.norm() < 1e-5);
    }

    #[test]
    fn test_admittance_surface_condition() {
        // ∂p/∂r + i k β p = 0 at r = a
        let (k, a) = (1.3, 1.0);
        let beta = Complex64::new(0.5, 0.8);
        let total = |r: f64| admittance_sphere_scattering_3d(k, a, beta, 25, &[r], &[0.6]).pressure[0];
        let h = 1e-5;
        let derivative = (total(a + h) - total(a - h)) / (2.0 * h);
        let residual = derivative + Complex64::i() * k * beta * total(a);
        assert!(residual.norm() < 1e-5 * total(a).norm(), "residual {residual}");

        let rigid = rigid_sphere_coefficients(k * a, 10);
        let zero = admittance_sphere_coefficients(k * a, Complex64::new(0.0, 0.0), 10);
        assert_eq!(rigid, zero);
    }
}
