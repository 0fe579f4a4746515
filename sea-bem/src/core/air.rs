//! Ambient air properties

use serde::{Deserialize, Serialize};

use crate::core::constants::*;
use crate::core::error::{BemError, Result};

/// Speed of sound, density and the ambient conditions they derive from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirProperties {
    /// Speed of sound c0 (m/s)
    pub sound_speed: f64,
    /// Density ρ0 (kg/m³)
    pub density: f64,
    /// Temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Atmospheric pressure (Pa)
    pub atmospheric_pressure: f64,
}

impl Default for AirProperties {
    fn default() -> Self {
        Self {
            sound_speed: DEFAULT_SPEED_OF_SOUND,
            density: DEFAULT_DENSITY,
            temperature: DEFAULT_TEMPERATURE,
            humidity: DEFAULT_HUMIDITY,
            atmospheric_pressure: DEFAULT_ATMOSPHERIC_PRESSURE,
        }
    }
}

impl AirProperties {
    /// Air with directly supplied c0 and ρ0
    pub fn new(sound_speed: f64, density: f64) -> Result<Self> {
        let air = Self {
            sound_speed,
            density,
            ..Self::default()
        };
        air.validate()?;
        Ok(air)
    }

    /// Air at the given conditions, c0 and ρ0 standardized from them
    pub fn from_conditions(temperature: f64, humidity: f64, atmospheric_pressure: f64) -> Self {
        let mut air = Self {
            temperature,
            humidity,
            atmospheric_pressure,
            ..Self::default()
        };
        air.standardize();
        air
    }

    /// Both c0 and ρ0 must be finite and positive
    pub fn validate(&self) -> Result<()> {
        if !(self.sound_speed.is_finite() && self.sound_speed > 0.0) {
            return Err(BemError::config(format!(
                "sound speed must be positive, got {}",
                self.sound_speed
            )));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(BemError::config(format!(
                "air density must be positive, got {}",
                self.density
            )));
        }
        Ok(())
    }

    /// Overwrite c0 and ρ0 from temperature, humidity and pressure
    ///
    /// Vapour pressure from Pierce, specific heats from a cubic fit in
    /// absolute temperature. Implausible inputs are not rejected and give
    /// NaN.
    pub fn standardize(&mut self) {
        let t = self.temperature + 273.16;
        let r = 287.031;
        let rvp = 461.521;
        let pvp = 0.0658 * t.powi(3) - 53.7558 * t.powi(2) + 14703.8127 * t - 1345485.0465;
        let cp = 4168.8 * (0.249679 - 7.55179e-5 * t + 1.69194e-7 * t.powi(2) - 6.46128e-11 * t.powi(3));
        let cv = cp - r;
        let gamma = cp / cv;

        let p = self.atmospheric_pressure;
        self.density = p / (r * t) - (1.0 / r - 1.0 / rvp) * self.humidity / 100.0 * pvp / t;
        self.sound_speed = (gamma * p / self.density).sqrt();
    }

    /// Characteristic impedance ρ0 c0
    pub fn characteristic_impedance(&self) -> f64 {
        self.density * self.sound_speed
    }

    /// Wavenumber 2πf / c0
    pub fn wavenumber(&self, frequency: f64) -> f64 {
        PI2 * frequency / self.sound_speed
    }
}

impl std::fmt::Display for AirProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "c0 = {:.2} m/s | rho0 = {:.4} kg/m3 | T = {} C | RH = {} % | p = {} Pa",
            self.sound_speed, self.density, self.temperature, self.humidity, self.atmospheric_pressure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standardize_reference_conditions() {
        let air = AirProperties::from_conditions(20.0, 50.0, 101325.0);
        assert_relative_eq!(air.sound_speed, 343.0, max_relative = 0.005);
        // the correlation gives 1.197 at these conditions
        assert_relative_eq!(air.density, 1.21, max_relative = 0.015);
    }

    #[test]
    fn test_standardize_overwrites_direct_values() {
        let mut air = AirProperties::new(300.0, 2.0).unwrap();
        air.standardize();
        assert!(air.sound_speed > 340.0);
        assert!(air.density < 1.3);
    }

    #[test]
    fn test_direct_values_are_validated() {
        assert!(AirProperties::new(-343.0, 1.21).unwrap_err().is_configuration());
        assert!(AirProperties::new(343.0, 0.0).unwrap_err().is_configuration());
        assert!(AirProperties::new(343.0, 1.21).is_ok());
    }

    #[test]
    fn test_implausible_conditions_give_nan() {
        let air = AirProperties::from_conditions(-400.0, 50.0, 101325.0);
        assert!(air.sound_speed.is_nan() || air.density <= 0.0);
    }

    #[test]
    fn test_wavenumber() {
        let air = AirProperties::default();
        assert_relative_eq!(air.wavenumber(343.0), PI2, epsilon = 1e-12);
        assert_relative_eq!(air.characteristic_impedance(), 415.03, epsilon = 1e-9);
    }
}
