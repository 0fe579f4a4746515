//! Surface impedance of common absorber constructions
//!
//! All impedances use the `exp(+jωt)` convention (passive walls have
//! Re Z ≥ 0). Layers sit on a rigid backing, optionally behind an air
//! cavity.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::air::AirProperties;
use crate::core::constants::{AIR_VISCOSITY, PI2};
use crate::core::error::{BemError, Result};

fn j() -> Complex64 {
    Complex64::new(0.0, 1.0)
}

fn cot(x: Complex64) -> Complex64 {
    x.cos() / x.sin()
}

fn require_positive(value: f64, what: &str) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BemError::config(format!("{what} must be positive, got {value}")))
    }
}

/// Reactance of an air cavity of depth `depth` on a rigid wall
fn cavity_impedance(depth: f64, k0: f64, rho_c: f64) -> Complex64 {
    -j() * rho_c * cot(Complex64::new(k0 * depth, 0.0))
}

/// Porous layer described by its flow resistivity
///
/// Uses Miki's positive-real refit of the Delany–Bazley power laws with
/// ρf/σ held inside the fitted range `[0.01, 1]`, so the layer stays
/// passive at low frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PorousLayer {
    /// Static airflow resistivity σ (Pa·s/m²)
    pub flow_resistivity: f64,
    /// Layer thickness (m)
    pub thickness: f64,
}

impl PorousLayer {
    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        require_positive(self.flow_resistivity, "flow resistivity")?;
        require_positive(self.thickness, "porous layer thickness")
    }

    /// Characteristic impedance and complex wavenumber of the material
    pub fn propagation(&self, frequency: f64, air: &AirProperties) -> (Complex64, Complex64) {
        let rho = air.density;
        let c = air.sound_speed;
        let x = (rho * frequency / self.flow_resistivity).clamp(0.01, 1.0);
        let zc = rho * c * Complex64::new(1.0 + 0.0699 * x.powf(-0.632), -0.107 * x.powf(-0.632));
        let kc = (PI2 * frequency / c) * Complex64::new(1.0 + 0.1093 * x.powf(-0.618), -0.1597 * x.powf(-0.618));
        (zc, kc)
    }

    /// Surface impedance on a rigid backing, `-j Zc cot(kc d)`
    pub fn surface_impedance(&self, frequency: f64, air: &AirProperties) -> Complex64 {
        let (zc, kc) = self.propagation(frequency, air);
        -j() * zc * cot(kc * self.thickness)
    }

    /// Surface impedance with an air cavity of `cavity_depth` behind the layer
    pub fn surface_impedance_with_cavity(
        &self,
        cavity_depth: f64,
        frequency: f64,
        air: &AirProperties,
    ) -> Complex64 {
        let (zc, kc) = self.propagation(frequency, air);
        let zb = cavity_impedance(cavity_depth, air.wavenumber(frequency), air.characteristic_impedance());
        let t = (kc * self.thickness).tan();
        zc * (zb + j() * zc * t) / (zc + j() * zb * t)
    }
}

/// Limp membrane in front of an air cavity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MembraneParams {
    /// Mass per unit area (kg/m²)
    pub surface_density: f64,
    /// Cavity depth (m)
    pub cavity_depth: f64,
    /// Added flow resistance (Pa·s/m)
    #[serde(default)]
    pub resistance: f64,
}

impl MembraneParams {
    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        require_positive(self.surface_density, "membrane surface density")?;
        require_positive(self.cavity_depth, "membrane cavity depth")?;
        if self.resistance < 0.0 || !self.resistance.is_finite() {
            return Err(BemError::config("membrane resistance must be non-negative"));
        }
        Ok(())
    }

    /// `jωm - jρc cot(k0 D) + R`
    pub fn surface_impedance(&self, frequency: f64, air: &AirProperties) -> Complex64 {
        let omega = PI2 * frequency;
        j() * omega * self.surface_density
            + cavity_impedance(self.cavity_depth, air.wavenumber(frequency), air.characteristic_impedance())
            + self.resistance
    }
}

/// Perforated panel (Helmholtz resonator array) in front of an air cavity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerforatedPanelParams {
    /// Panel thickness (m)
    pub thickness: f64,
    /// Hole radius (m)
    pub hole_radius: f64,
    /// Open area ratio ε (0..1)
    pub open_area: f64,
    /// Cavity depth (m)
    pub cavity_depth: f64,
}

impl PerforatedPanelParams {
    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        require_positive(self.thickness, "panel thickness")?;
        require_positive(self.hole_radius, "hole radius")?;
        require_positive(self.cavity_depth, "panel cavity depth")?;
        if !(self.open_area > 0.0 && self.open_area < 1.0) {
            return Err(BemError::config(format!(
                "open area ratio must lie in (0, 1), got {}",
                self.open_area
            )));
        }
        Ok(())
    }

    /// Hole mass with end correction, viscous loss and cavity stiffness
    pub fn surface_impedance(&self, frequency: f64, air: &AirProperties) -> Complex64 {
        let omega = PI2 * frequency;
        let rho = air.density;
        let eps = self.open_area;
        let a = self.hole_radius;

        let delta = 0.85 * a * (1.0 - 1.47 * eps.sqrt() + 0.47 * eps.powf(1.5));
        let nu = AIR_VISCOSITY / rho;
        let resistance = rho / eps * (8.0 * nu * omega).sqrt() * (1.0 + self.thickness / (2.0 * a));
        let mass = j() * omega * rho * (self.thickness + 2.0 * delta) / eps;

        mass + resistance
            + cavity_impedance(self.cavity_depth, air.wavenumber(frequency), air.characteristic_impedance())
    }
}

/// Microperforated panel (Maa) in front of an air cavity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MicroperforatedParams {
    /// Panel thickness (m)
    pub thickness: f64,
    /// Hole diameter (m)
    pub hole_diameter: f64,
    /// Open area ratio ε (0..1)
    pub open_area: f64,
    /// Cavity depth (m)
    pub cavity_depth: f64,
}

impl MicroperforatedParams {
    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        require_positive(self.thickness, "panel thickness")?;
        require_positive(self.hole_diameter, "hole diameter")?;
        require_positive(self.cavity_depth, "panel cavity depth")?;
        if !(self.open_area > 0.0 && self.open_area < 1.0) {
            return Err(BemError::config(format!(
                "open area ratio must lie in (0, 1), got {}",
                self.open_area
            )));
        }
        Ok(())
    }

    /// Maa's relative impedance times ρ0 c0
    pub fn surface_impedance(&self, frequency: f64, air: &AirProperties) -> Complex64 {
        let omega = PI2 * frequency;
        let rho = air.density;
        let c = air.sound_speed;
        let eta = AIR_VISCOSITY;
        let (t, d, eps) = (self.thickness, self.hole_diameter, self.open_area);

        let x = d * (omega * rho / (4.0 * eta)).sqrt();
        let r = 32.0 * eta * t / (eps * rho * c * d * d)
            * ((1.0 + x * x / 32.0).sqrt() + 2.0_f64.sqrt() / 32.0 * x * d / t);
        let m = omega * t / (eps * c) * (1.0 + 1.0 / (9.0 + x * x / 2.0).sqrt() + 0.85 * d / t);
        let z = Complex64::new(r, m) - j() * cot(Complex64::new(air.wavenumber(frequency) * self.cavity_depth, 0.0));

        z * air.characteristic_impedance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air() -> AirProperties {
        AirProperties::default()
    }

    #[test]
    fn test_porous_is_passive_and_absorbing() {
        let layer = PorousLayer {
            flow_resistivity: 10_000.0,
            thickness: 0.05,
        };
        layer.validate().unwrap();
        for f in [100.0, 500.0, 2000.0] {
            let z = layer.surface_impedance(f, &air());
            assert!(z.re > 0.0, "Re Z = {} at {f}", z.re);
        }
        // thick porous layers approach the characteristic impedance
        let thick = PorousLayer {
            flow_resistivity: 10_000.0,
            thickness: 2.0,
        };
        let (zc, _) = thick.propagation(2000.0, &air());
        let z = thick.surface_impedance(2000.0, &air());
        assert!((z - zc).norm() / zc.norm() < 1e-3);
    }

    #[test]
    fn test_porous_stays_passive_at_low_frequency() {
        // ρf/σ ≈ 0.005 at 63 Hz, below the empirical range
        let layer = PorousLayer {
            flow_resistivity: 15_000.0,
            thickness: 0.05,
        };
        for f in [20.0, 31.5, 63.0, 80.0] {
            let z = layer.surface_impedance(f, &air());
            assert!(z.re >= 0.0, "Re Z = {} at {f}", z.re);
            let z = layer.surface_impedance_with_cavity(0.1, f, &air());
            assert!(z.re >= 0.0, "Re Z = {} with cavity at {f}", z.re);
        }
    }

    #[test]
    fn test_cavity_shifts_porous_impedance() {
        let layer = PorousLayer {
            flow_resistivity: 20_000.0,
            thickness: 0.03,
        };
        let a = layer.surface_impedance(250.0, &air());
        let b = layer.surface_impedance_with_cavity(0.1, 250.0, &air());
        assert!((a - b).norm() > 1.0);
        assert!(b.re > 0.0);
    }

    #[test]
    fn test_membrane_resonance() {
        let membrane = MembraneParams {
            surface_density: 5.0,
            cavity_depth: 0.1,
            resistance: 100.0,
        };
        membrane.validate().unwrap();
        // f0 ≈ 60 / sqrt(m d)
        let f0 = 60.0 / (5.0_f64 * 0.1).sqrt();
        let z = membrane.surface_impedance(f0, &air());
        assert!(z.im.abs() < 0.1 * (PI2 * f0 * 5.0));
        assert_eq!(z.re, 100.0);
    }

    #[test]
    fn test_panels_are_passive() {
        let panel = PerforatedPanelParams {
            thickness: 0.01,
            hole_radius: 0.004,
            open_area: 0.1,
            cavity_depth: 0.05,
        };
        let mpp = MicroperforatedParams {
            thickness: 0.0005,
            hole_diameter: 0.0005,
            open_area: 0.01,
            cavity_depth: 0.05,
        };
        panel.validate().unwrap();
        mpp.validate().unwrap();
        for f in [125.0, 500.0, 1000.0, 4000.0] {
            assert!(panel.surface_impedance(f, &air()).re > 0.0);
            assert!(mpp.surface_impedance(f, &air()).re > 0.0);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let bad = PerforatedPanelParams {
            thickness: 0.01,
            hole_radius: 0.004,
            open_area: 1.5,
            cavity_depth: 0.05,
        };
        assert!(bad.validate().unwrap_err().is_configuration());
        assert!(PorousLayer { flow_resistivity: -1.0, thickness: 0.1 }.validate().is_err());
    }
}
