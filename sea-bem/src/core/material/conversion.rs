//! Conversions between boundary descriptions
//!
//! Normalized quantities are relative to the characteristic impedance ρ0 c0.
//! Admittance is the normal velocity into the wall over pressure.

use num_complex::Complex64;

/// Y = 1/Z
pub fn impedance_to_admittance(impedance: Complex64) -> Complex64 {
    if impedance.norm() == 0.0 {
        return Complex64::new(f64::INFINITY, 0.0);
    }
    impedance.inv()
}

/// Z = 1/Y
pub fn admittance_to_impedance(admittance: Complex64) -> Complex64 {
    if admittance.norm() == 0.0 {
        return Complex64::new(f64::INFINITY, 0.0);
    }
    admittance.inv()
}

/// Y = 1/(z ρ0 c0) for a normalized impedance z
pub fn normalized_impedance_to_admittance(z: Complex64, characteristic_impedance: f64) -> Complex64 {
    impedance_to_admittance(z * characteristic_impedance)
}

/// z = (1 + R)/(1 - R)
pub fn reflection_to_normalized_impedance(reflection: Complex64) -> Complex64 {
    let one = Complex64::new(1.0, 0.0);
    (one + reflection) / (one - reflection)
}

/// Y = (1 - R)/((1 + R) ρ0 c0); a fully reflecting wall gives Y = 0
pub fn reflection_to_admittance(reflection: Complex64, characteristic_impedance: f64) -> Complex64 {
    let one = Complex64::new(1.0, 0.0);
    (one - reflection) / ((one + reflection) * characteristic_impedance)
}

/// Real normalized impedance `z = (1 + √(1-α))/(1 - √(1-α))`
pub fn absorption_to_normalized_impedance(alpha: f64) -> f64 {
    let r = (1.0 - alpha).max(0.0).sqrt();
    (1.0 + r) / (1.0 - r)
}

/// Admittance of a real impedance with normal-incidence absorption α
pub fn absorption_to_admittance(alpha: f64, characteristic_impedance: f64) -> Complex64 {
    reflection_to_admittance(Complex64::new((1.0 - alpha).max(0.0).sqrt(), 0.0), characteristic_impedance)
}

/// Normal-incidence absorption `1 - |R|²` of a normalized impedance
pub fn absorption_from_normalized_impedance(z: Complex64) -> f64 {
    let one = Complex64::new(1.0, 0.0);
    let r = (z - one) / (z + one);
    1.0 - r.norm_sqr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RHO_C: f64 = 415.03;

    #[test]
    fn test_matched_wall() {
        let y = normalized_impedance_to_admittance(Complex64::new(1.0, 0.0), RHO_C);
        assert_relative_eq!(y.re, 1.0 / RHO_C, epsilon = 1e-15);
        assert_relative_eq!(absorption_to_normalized_impedance(1.0), 1.0);
        assert_relative_eq!(absorption_from_normalized_impedance(Complex64::new(1.0, 0.0)), 1.0);
    }

    #[test]
    fn test_absorption_round_trip() {
        for alpha in [0.05, 0.3, 0.7, 0.99] {
            let z = absorption_to_normalized_impedance(alpha);
            assert_relative_eq!(absorption_from_normalized_impedance(Complex64::new(z, 0.0)), alpha, epsilon = 1e-12);
            let y = absorption_to_admittance(alpha, RHO_C);
            assert_relative_eq!(y.re * z * RHO_C, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rigid_limits() {
        assert_eq!(absorption_to_admittance(0.0, RHO_C), Complex64::new(0.0, 0.0));
        assert_eq!(reflection_to_admittance(Complex64::new(1.0, 0.0), RHO_C), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_reflection_to_impedance() {
        let z = reflection_to_normalized_impedance(Complex64::new(0.5, 0.0));
        assert_relative_eq!(z.re, 3.0);
        let y = impedance_to_admittance(z * RHO_C);
        assert_relative_eq!((admittance_to_impedance(y) - z * RHO_C).norm(), 0.0, epsilon = 1e-9);
    }
}
