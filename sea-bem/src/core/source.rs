//! Sound sources and the incident field they radiate
//!
//! A [`SourceSpec`] is what the user describes; a [`Source`] is that
//! description evaluated on the session grid (strength per frequency, or
//! oriented multipole coefficients per frequency).

use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use sea_wave::special::{harmonic_count, outgoing_field, rotation_matrix};
use sea_wave::{analytical, Point};
use std::f64::consts::FRAC_PI_2;

use crate::core::air::AirProperties;
use crate::core::constants::{PI2, PI4, REFERENCE_POWER};
use crate::core::error::{ensure_grid_len, BemError, Result};
use crate::core::frequency::{interpolate_clamped, validate_band_table, FrequencyGrid};

/// How the strength `q` of a monopole is given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonopoleStrength {
    /// Same complex strength at every frequency
    Constant {
        /// Strength q
        value: Complex64,
    },
    /// One complex strength per grid frequency
    Spectrum {
        /// Strengths aligned with the grid
        values: Vec<Complex64>,
    },
    /// Sound power levels (dB re 1 pW) in bands, interpolated onto the grid
    PowerSpectrum {
        /// Band centre frequencies, ascending
        bands: Vec<f64>,
        /// Power level per band
        levels_db: Vec<f64>,
    },
    /// One sound power level for every frequency
    WhiteSpectrum {
        /// Power level (dB re 1 pW)
        level_db: f64,
    },
}

impl Default for MonopoleStrength {
    fn default() -> Self {
        MonopoleStrength::Constant {
            value: Complex64::new(1.0, 0.0),
        }
    }
}

/// Monopole strength radiating the sound power level `level_db`
///
/// `q = (4π/ρ0) sqrt(ρ0 c0 10^(L/10) W0 / (2π))`
pub fn strength_from_power_level(level_db: f64, air: &AirProperties) -> f64 {
    let power = 10f64.powf(level_db / 10.0) * REFERENCE_POWER;
    PI4 / air.density * (air.density * air.sound_speed * power / PI2).sqrt()
}

impl MonopoleStrength {
    /// Whether the strength is given as levels and needs the air
    pub fn needs_air(&self) -> bool {
        matches!(
            self,
            MonopoleStrength::PowerSpectrum { .. } | MonopoleStrength::WhiteSpectrum { .. }
        )
    }

    /// Strength at every grid frequency
    pub fn evaluate(&self, grid: &FrequencyGrid, air: Option<&AirProperties>) -> Result<Vec<Complex64>> {
        let level_air = || {
            air.ok_or_else(|| BemError::config("level-based source strength needs the air properties"))
        };
        match self {
            MonopoleStrength::Constant { value } => Ok(vec![*value; grid.len()]),
            MonopoleStrength::Spectrum { values } => {
                ensure_grid_len(grid.len(), values.len(), "source strength spectrum")?;
                Ok(values.clone())
            }
            MonopoleStrength::PowerSpectrum { bands, levels_db } => {
                validate_band_table(bands, levels_db, "source power spectrum")?;
                let air = level_air()?;
                Ok(grid
                    .frequencies()
                    .iter()
                    .map(|&f| {
                        let level = interpolate_clamped(bands, levels_db, f);
                        Complex64::new(strength_from_power_level(level, air), 0.0)
                    })
                    .collect())
            }
            MonopoleStrength::WhiteSpectrum { level_db } => {
                let q = strength_from_power_level(*level_db, level_air()?);
                Ok(vec![Complex64::new(q, 0.0); grid.len()])
            }
        }
    }
}

/// Omnidirectional point source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonopoleSpec {
    /// Source position (m)
    pub position: [f64; 3],
    /// Strength per frequency
    #[serde(default)]
    pub strength: MonopoleStrength,
}

/// Multipole description of a directional source
///
/// Row `f` of `coefficients` holds the `(order + 1)²` outgoing-field
/// coefficients at `frequencies[f]`, front pole along +x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectivityDescriptor {
    /// Expansion order
    pub order: usize,
    /// Frequencies the coefficients are given at
    pub frequencies: Vec<f64>,
    /// Coefficients, one row per frequency
    pub coefficients: Vec<Vec<Complex64>>,
}

impl DirectivityDescriptor {
    /// Check the coefficient table shape
    pub fn validate(&self) -> Result<()> {
        if self.frequencies.is_empty() {
            return Err(BemError::config("directivity descriptor has no frequencies"));
        }
        if self.coefficients.len() != self.frequencies.len() {
            return Err(BemError::config(format!(
                "directivity descriptor has {} coefficient rows for {} frequencies",
                self.coefficients.len(),
                self.frequencies.len()
            )));
        }
        let count = harmonic_count(self.order);
        if let Some(row) = self.coefficients.iter().find(|row| row.len() != count) {
            return Err(BemError::config(format!(
                "directivity descriptor of order {} needs {count} coefficients per frequency, got {}",
                self.order,
                row.len()
            )));
        }
        Ok(())
    }

    /// Whether the descriptor is defined on exactly the frequencies of `grid`
    pub fn matches_grid(&self, grid: &FrequencyGrid) -> bool {
        self.frequencies.len() == grid.len()
            && self
                .frequencies
                .iter()
                .zip(grid.frequencies())
                .all(|(a, b)| (a - b).abs() <= 1e-9 * b.abs().max(1.0))
    }
}

fn default_power_correction() -> f64 {
    1.0
}

/// Directional source described by a multipole expansion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalSpec {
    /// Source position (m)
    pub position: [f64; 3],
    /// Multipole coefficients per frequency
    pub descriptor: DirectivityDescriptor,
    /// Elevation of the main axis (degrees)
    #[serde(default)]
    pub elevation_deg: f64,
    /// Azimuth of the main axis (degrees)
    #[serde(default)]
    pub azimuth_deg: f64,
    /// Linear factor applied to the radiated field
    #[serde(default = "default_power_correction")]
    pub power_correction: f64,
}

/// User-facing source description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceSpec {
    /// Point source
    Monopole(MonopoleSpec),
    /// Multipole source with its own frequency grid
    Directional(DirectionalSpec),
}

impl SourceSpec {
    /// Unit monopole at `position`
    pub fn monopole(position: [f64; 3]) -> Self {
        SourceSpec::Monopole(MonopoleSpec {
            position,
            strength: MonopoleStrength::default(),
        })
    }

    /// Source position
    pub fn position(&self) -> [f64; 3] {
        match self {
            SourceSpec::Monopole(spec) => spec.position,
            SourceSpec::Directional(spec) => spec.position,
        }
    }

    /// The descriptor of a directional source
    pub fn descriptor(&self) -> Option<&DirectivityDescriptor> {
        match self {
            SourceSpec::Monopole(_) => None,
            SourceSpec::Directional(spec) => Some(&spec.descriptor),
        }
    }
}

/// What a session does when a directional source brings its own grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridPolicy {
    /// Replace the session grid with the descriptor grid and re-derive
    /// every material and source
    #[default]
    AdoptDescriptor,
    /// Refuse descriptors whose grid differs from the session grid
    Reject,
}

/// Source evaluated on the session grid
#[derive(Debug, Clone, PartialEq)]
enum Excitation {
    Monopole {
        strength: Vec<Complex64>,
    },
    Directional {
        order: usize,
        coefficients: Vec<Vec<Complex64>>,
        power_correction: f64,
    },
}

/// A source ready to be solved for
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    spec: SourceSpec,
    position: Point,
    excitation: Excitation,
}

impl Source {
    /// Evaluate `spec` on `grid`
    ///
    /// Level-based monopole strengths need `air`. Directional sources must
    /// already share the grid of their descriptor.
    pub fn build(spec: SourceSpec, grid: &FrequencyGrid, air: Option<&AirProperties>) -> Result<Self> {
        let position = Point::from_array(spec.position());
        if !position.to_array().iter().all(|c| c.is_finite()) {
            return Err(BemError::config("source position must be finite"));
        }

        let excitation = match &spec {
            SourceSpec::Monopole(monopole) => Excitation::Monopole {
                strength: monopole.strength.evaluate(grid, air)?,
            },
            SourceSpec::Directional(directional) => {
                let descriptor = &directional.descriptor;
                descriptor.validate()?;
                if !descriptor.matches_grid(grid) {
                    return Err(BemError::InconsistentGrid {
                        expected: grid.len(),
                        found: descriptor.frequencies.len(),
                        context: "directivity descriptor frequencies".to_string(),
                    });
                }
                Excitation::Directional {
                    order: descriptor.order,
                    coefficients: oriented_coefficients(directional),
                    power_correction: directional.power_correction,
                }
            }
        };

        Ok(Self {
            spec,
            position,
            excitation,
        })
    }

    /// The description this source was built from
    pub fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    /// Source position
    pub fn position(&self) -> Point {
        self.position
    }

    /// Whether the source radiates through a multipole expansion
    pub fn is_directional(&self) -> bool {
        matches!(self.excitation, Excitation::Directional { .. })
    }

    /// Number of frequencies the source was built for
    pub fn num_frequencies(&self) -> usize {
        match &self.excitation {
            Excitation::Monopole { strength } => strength.len(),
            Excitation::Directional { coefficients, .. } => coefficients.len(),
        }
    }

    /// Monopole strength at frequency index `fi` (None for directional sources)
    pub fn strength(&self, fi: usize) -> Option<Complex64> {
        match &self.excitation {
            Excitation::Monopole { strength } => strength.get(fi).copied(),
            Excitation::Directional { .. } => None,
        }
    }

    /// Incident pressure at `x`
    pub fn pressure(&self, fi: usize, k: f64, x: &Point) -> Complex64 {
        self.field(fi, k, x, &[0.0, 0.0, 0.0]).0
    }

    /// Incident pressure and its derivative along `normal` at `x`
    pub fn field(&self, fi: usize, k: f64, x: &Point, normal: &[f64; 3]) -> (Complex64, Complex64) {
        match &self.excitation {
            Excitation::Monopole { strength } => {
                let q = strength[fi];
                (
                    analytical::point_source_pressure(q, &self.position, x, k),
                    analytical::point_source_normal_derivative(q, &self.position, x, normal, k),
                )
            }
            Excitation::Directional {
                order,
                coefficients,
                power_correction,
            } => {
                let offset = x.sub(&self.position).to_array();
                let (p, dp) = outgoing_field(k, &coefficients[fi], *order, offset, *normal);
                (p * *power_correction, dp * *power_correction)
            }
        }
    }
}

/// Rotate the descriptor front pole (+x) to the top pole (+z), then the
/// top pole towards (elevation, azimuth)
fn oriented_coefficients(spec: &DirectionalSpec) -> Vec<Vec<Complex64>> {
    let order = spec.descriptor.order;
    let front_to_top = rotation_matrix(order, 0.0, -FRAC_PI_2, 0.0);
    let aim = rotation_matrix(
        order,
        spec.azimuth_deg.to_radians(),
        FRAC_PI_2 - spec.elevation_deg.to_radians(),
        0.0,
    );
    let rotation = aim.dot(&front_to_top);

    spec.descriptor
        .coefficients
        .iter()
        .map(|row| rotation.dot(&Array1::from_vec(row.clone())).to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sea_wave::special::harmonic_index;

    fn grid() -> FrequencyGrid {
        FrequencyGrid::from_values(vec![100.0, 200.0, 400.0], 343.0).unwrap()
    }

    #[test]
    fn test_unit_monopole_is_free_field() {
        let source = Source::build(SourceSpec::monopole([0.0, 0.0, 0.0]), &grid(), None).unwrap();
        let k = grid().wavenumbers()[1];
        let x = Point::new(1.0, 2.0, -0.5);
        let r = x.radius();
        let expected = Complex64::from_polar(1.0 / (PI4 * r), k * r);
        let p = source.pressure(1, k, &x);
        assert_relative_eq!(p.re, expected.re, epsilon = 1e-15);
        assert_relative_eq!(p.im, expected.im, epsilon = 1e-15);
    }

    #[test]
    fn test_power_level_strength() {
        let air = AirProperties::default();
        let q = strength_from_power_level(94.0, &air);
        // invert the level formula
        let power = (q * air.density / PI4).powi(2) * PI2 / (air.density * air.sound_speed);
        assert_relative_eq!(power, 10f64.powf(9.4) * 1e-12, max_relative = 1e-12);

        let spec = SourceSpec::Monopole(MonopoleSpec {
            position: [0.0; 3],
            strength: MonopoleStrength::WhiteSpectrum { level_db: 94.0 },
        });
        assert!(Source::build(spec.clone(), &grid(), None).unwrap_err().is_configuration());
        let source = Source::build(spec, &grid(), Some(&air)).unwrap();
        assert_relative_eq!(source.strength(2).unwrap().re, q);
    }

    #[test]
    fn test_power_spectrum_clamps_outside_bands() {
        let air = AirProperties::default();
        let strength = MonopoleStrength::PowerSpectrum {
            bands: vec![150.0, 300.0],
            levels_db: vec![80.0, 90.0],
        };
        let q = strength.evaluate(&grid(), Some(&air)).unwrap();
        assert_relative_eq!(q[0].re, strength_from_power_level(80.0, &air));
        assert_relative_eq!(q[2].re, strength_from_power_level(90.0, &air));
        assert_relative_eq!(q[1].re, strength_from_power_level(80.0 + 10.0 / 3.0, &air), max_relative = 1e-12);
    }

    #[test]
    fn test_spectrum_length_checked() {
        let strength = MonopoleStrength::Spectrum {
            values: vec![Complex64::new(1.0, 0.0); 2],
        };
        assert!(strength.evaluate(&grid(), None).unwrap_err().is_inconsistent_grid());
    }

    fn dipole_descriptor(frequencies: Vec<f64>) -> DirectivityDescriptor {
        // m = ±1 combination pointing along +x
        let mut row = vec![Complex64::new(0.0, 0.0); harmonic_count(1)];
        row[harmonic_index(1, -1)] = Complex64::new(1.0, 0.0);
        row[harmonic_index(1, 1)] = Complex64::new(-1.0, 0.0);
        DirectivityDescriptor {
            order: 1,
            coefficients: vec![row; frequencies.len()],
            frequencies,
        }
    }

    #[test]
    fn test_directional_grid_must_match() {
        let spec = SourceSpec::Directional(DirectionalSpec {
            position: [0.0; 3],
            descriptor: dipole_descriptor(vec![100.0, 200.0]),
            elevation_deg: 0.0,
            azimuth_deg: 0.0,
            power_correction: 1.0,
        });
        assert!(Source::build(spec, &grid(), None).unwrap_err().is_inconsistent_grid());
    }

    #[test]
    fn test_directional_orientation() {
        let k = grid().wavenumbers()[0];
        let unrotated = dipole_descriptor(grid().frequencies().to_vec());
        let front = Point::new(2.0, 0.0, 0.0);
        let reference = sea_wave::special::outgoing_pressure(k, &unrotated.coefficients[0], 1, front.to_array());

        // azimuth 90 turns the +x lobe onto +y
        let spec = SourceSpec::Directional(DirectionalSpec {
            position: [0.0; 3],
            descriptor: unrotated,
            elevation_deg: 0.0,
            azimuth_deg: 90.0,
            power_correction: 2.0,
        });
        let source = Source::build(spec, &grid(), None).unwrap();
        let p = source.pressure(0, k, &Point::new(0.0, 2.0, 0.0));
        assert_relative_eq!(p.norm(), 2.0 * reference.norm(), max_relative = 1e-9);
        assert!(source.pressure(0, k, &Point::new(2.0, 0.0, 0.0)).norm() < 1e-9 * reference.norm());
        assert!(source.is_directional());
        assert!(source.strength(0).is_none());
    }
}
