//! Boundary materials and their frequency-dependent admittance
//!
//! A material turns the session grid and air into one admittance per
//! frequency: normal velocity into the wall over pressure, `exp(+iωt)`
//! convention. The solver conjugates it into its own `exp(-iωt)` frame.
//!
//! - [`conversion`]: impedance, reflection and absorption conversions
//! - [`models`]: porous, membrane and perforated absorbers

pub mod conversion;
pub mod models;

pub use conversion::*;
pub use models::{MembraneParams, MicroperforatedParams, PerforatedPanelParams, PorousLayer};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::air::AirProperties;
use crate::core::error::{ensure_grid_len, BemError, Result};
use crate::core::frequency::{interpolate_clamped, validate_band_table, FrequencyGrid};

/// Every way a boundary region can be described
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialKind {
    /// Perfectly reflecting, zero admittance
    #[default]
    Rigid,
    /// Admittance per grid frequency (m/(Pa·s))
    Admittance {
        /// One value per frequency
        values: Vec<Complex64>,
    },
    /// Surface impedance per grid frequency (Pa·s/m)
    SurfaceImpedance {
        /// One value per frequency
        values: Vec<Complex64>,
    },
    /// Impedance relative to ρ0 c0 per grid frequency
    NormalizedImpedance {
        /// One value per frequency
        values: Vec<Complex64>,
    },
    /// Normal-incidence pressure reflection coefficient per grid frequency
    ReflectionCoefficient {
        /// One value per frequency
        values: Vec<Complex64>,
    },
    /// Normal-incidence absorption coefficient per grid frequency
    NormalIncidenceAbsorption {
        /// One value per frequency, in [0, 1]
        values: Vec<f64>,
    },
    /// Absorption coefficients in bands, interpolated onto the grid
    OctaveBandAbsorption {
        /// Band centre frequencies, ascending
        bands: Vec<f64>,
        /// Absorption per band, in [0, 1]
        alpha: Vec<f64>,
    },
    /// Porous layer on a rigid wall
    Porous(PorousLayer),
    /// Porous layer in front of an air cavity
    PorousWithCavity {
        /// The porous layer
        layer: PorousLayer,
        /// Depth of the air gap behind it (m)
        cavity_depth: f64,
    },
    /// Limp membrane absorber
    Membrane(MembraneParams),
    /// Perforated panel absorber
    PerforatedPanel(PerforatedPanelParams),
    /// Microperforated panel absorber
    Microperforated(MicroperforatedParams),
}

fn check_absorption(values: &[f64]) -> Result<()> {
    match values.iter().find(|a| !(0.0..=1.0).contains(*a)) {
        Some(a) => Err(BemError::config(format!(
            "absorption coefficients must lie in [0, 1], got {a}"
        ))),
        None => Ok(()),
    }
}

impl MaterialKind {
    /// Short name used in listings and logs
    pub fn name(&self) -> &'static str {
        match self {
            MaterialKind::Rigid => "rigid",
            MaterialKind::Admittance { .. } => "admittance",
            MaterialKind::SurfaceImpedance { .. } => "surface impedance",
            MaterialKind::NormalizedImpedance { .. } => "normalized impedance",
            MaterialKind::ReflectionCoefficient { .. } => "reflection coefficient",
            MaterialKind::NormalIncidenceAbsorption { .. } => "normal incidence absorption",
            MaterialKind::OctaveBandAbsorption { .. } => "octave band absorption",
            MaterialKind::Porous(_) => "porous",
            MaterialKind::PorousWithCavity { .. } => "porous with cavity",
            MaterialKind::Membrane(_) => "membrane",
            MaterialKind::PerforatedPanel(_) => "perforated panel",
            MaterialKind::Microperforated(_) => "microperforated panel",
        }
    }

    /// Whether the material is exactly rigid
    pub fn is_rigid(&self) -> bool {
        matches!(self, MaterialKind::Rigid)
    }

    /// Check the parameters that do not depend on the grid
    pub fn validate(&self) -> Result<()> {
        match self {
            MaterialKind::NormalIncidenceAbsorption { values } => check_absorption(values),
            MaterialKind::OctaveBandAbsorption { bands, alpha } => {
                validate_band_table(bands, alpha, "octave band absorption")?;
                check_absorption(alpha)
            }
            MaterialKind::Porous(layer) => layer.validate(),
            MaterialKind::PorousWithCavity { layer, cavity_depth } => {
                layer.validate()?;
                if !(cavity_depth.is_finite() && *cavity_depth > 0.0) {
                    return Err(BemError::config(format!(
                        "cavity depth must be positive, got {cavity_depth}"
                    )));
                }
                Ok(())
            }
            MaterialKind::Membrane(params) => params.validate(),
            MaterialKind::PerforatedPanel(params) => params.validate(),
            MaterialKind::Microperforated(params) => params.validate(),
            _ => Ok(()),
        }
    }

    /// Admittance at every grid frequency
    ///
    /// Tables must match the grid length, otherwise
    /// [`BemError::InconsistentGrid`] is returned.
    pub fn admittance(&self, grid: &FrequencyGrid, air: &AirProperties) -> Result<Vec<Complex64>> {
        self.validate()?;
        let rho_c = air.characteristic_impedance();
        let n = grid.len();
        let per_frequency = |f: &dyn Fn(f64) -> Complex64| -> Vec<Complex64> {
            grid.frequencies().iter().map(|&freq| f(freq)).collect()
        };

        let admittance = match self {
            MaterialKind::Rigid => vec![Complex64::new(0.0, 0.0); n],
            MaterialKind::Admittance { values } => {
                ensure_grid_len(n, values.len(), "admittance table")?;
                values.clone()
            }
            MaterialKind::SurfaceImpedance { values } => {
                ensure_grid_len(n, values.len(), "surface impedance table")?;
                values.iter().map(|z| impedance_to_admittance(*z)).collect()
            }
            MaterialKind::NormalizedImpedance { values } => {
                ensure_grid_len(n, values.len(), "normalized impedance table")?;
                values
                    .iter()
                    .map(|z| normalized_impedance_to_admittance(*z, rho_c))
                    .collect()
            }
            MaterialKind::ReflectionCoefficient { values } => {
                ensure_grid_len(n, values.len(), "reflection coefficient table")?;
                values.iter().map(|r| reflection_to_admittance(*r, rho_c)).collect()
            }
            MaterialKind::NormalIncidenceAbsorption { values } => {
                ensure_grid_len(n, values.len(), "absorption table")?;
                values.iter().map(|a| absorption_to_admittance(*a, rho_c)).collect()
            }
            MaterialKind::OctaveBandAbsorption { bands, alpha } => per_frequency(&|f| {
                absorption_to_admittance(interpolate_clamped(bands, alpha, f), rho_c)
            }),
            MaterialKind::Porous(layer) => {
                per_frequency(&|f| impedance_to_admittance(layer.surface_impedance(f, air)))
            }
            MaterialKind::PorousWithCavity { layer, cavity_depth } => per_frequency(&|f| {
                impedance_to_admittance(layer.surface_impedance_with_cavity(*cavity_depth, f, air))
            }),
            MaterialKind::Membrane(params) => {
                per_frequency(&|f| impedance_to_admittance(params.surface_impedance(f, air)))
            }
            MaterialKind::PerforatedPanel(params) => {
                per_frequency(&|f| impedance_to_admittance(params.surface_impedance(f, air)))
            }
            MaterialKind::Microperforated(params) => {
                per_frequency(&|f| impedance_to_admittance(params.surface_impedance(f, air)))
            }
        };

        if let Some(y) = admittance.iter().find(|y| !(y.re.is_finite() && y.im.is_finite())) {
            return Err(BemError::config(format!(
                "{} material gives a non-finite admittance {y}",
                self.name()
            )));
        }
        Ok(admittance)
    }
}

/// A material bound to a surface region, with its admittance on the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialBoundaryCondition {
    /// How the material was described
    pub kind: MaterialKind,
    /// Region the material applies to
    pub region: usize,
    /// Admittance per grid frequency
    pub admittance: Vec<Complex64>,
}

impl MaterialBoundaryCondition {
    /// Derive the admittance of `kind` on `grid`
    pub fn new(kind: MaterialKind, region: usize, grid: &FrequencyGrid, air: &AirProperties) -> Result<Self> {
        let admittance = kind.admittance(grid, air)?;
        Ok(Self {
            kind,
            region,
            admittance,
        })
    }

    /// Rigid region
    pub fn rigid(region: usize, num_frequencies: usize) -> Self {
        Self {
            kind: MaterialKind::Rigid,
            region,
            admittance: vec![Complex64::new(0.0, 0.0); num_frequencies],
        }
    }

    /// Recompute the admittance after the grid or the air changed
    pub fn rederive(&mut self, grid: &FrequencyGrid, air: &AirProperties) -> Result<()> {
        self.admittance = self.kind.admittance(grid, air)?;
        Ok(())
    }

    /// Whether the region reflects perfectly at every frequency
    pub fn is_rigid(&self) -> bool {
        self.kind.is_rigid() || self.admittance.iter().all(|y| y.norm() == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid() -> FrequencyGrid {
        FrequencyGrid::from_values(vec![63.0, 125.0, 250.0, 500.0, 1000.0, 2000.0], 343.0).unwrap()
    }

    fn all_kinds() -> Vec<MaterialKind> {
        vec![
            MaterialKind::Rigid,
            MaterialKind::NormalIncidenceAbsorption {
                values: vec![0.1, 0.2, 0.4, 0.6, 0.8, 0.9],
            },
            MaterialKind::OctaveBandAbsorption {
                bands: vec![125.0, 250.0, 500.0, 1000.0],
                alpha: vec![0.05, 0.1, 0.3, 0.6],
            },
            MaterialKind::Porous(PorousLayer {
                flow_resistivity: 15_000.0,
                thickness: 0.05,
            }),
            MaterialKind::PorousWithCavity {
                layer: PorousLayer {
                    flow_resistivity: 15_000.0,
                    thickness: 0.05,
                },
                cavity_depth: 0.2,
            },
            MaterialKind::Membrane(MembraneParams {
                surface_density: 3.0,
                cavity_depth: 0.15,
                resistance: 50.0,
            }),
            MaterialKind::PerforatedPanel(PerforatedPanelParams {
                thickness: 0.012,
                hole_radius: 0.005,
                open_area: 0.08,
                cavity_depth: 0.1,
            }),
            MaterialKind::Microperforated(MicroperforatedParams {
                thickness: 0.0008,
                hole_diameter: 0.0006,
                open_area: 0.012,
                cavity_depth: 0.1,
            }),
        ]
    }

    #[test]
    fn test_rigid_is_zero() {
        let y = MaterialKind::Rigid.admittance(&grid(), &AirProperties::default()).unwrap();
        assert_eq!(y.len(), 6);
        assert!(y.iter().all(|y| *y == Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_every_kind_is_passive() {
        let air = AirProperties::default();
        for kind in all_kinds() {
            let y = kind.admittance(&grid(), &air).unwrap();
            assert_eq!(y.len(), grid().len());
            for value in y {
                assert!(value.re >= -1e-15, "{} gives Re Y = {}", kind.name(), value.re);
            }
        }
    }

    #[test]
    fn test_table_length_must_match_grid() {
        let kind = MaterialKind::Admittance {
            values: vec![Complex64::new(0.001, 0.0); 3],
        };
        let err = kind.admittance(&grid(), &AirProperties::default()).unwrap_err();
        assert!(err.is_inconsistent_grid());
    }

    #[test]
    fn test_band_absorption_is_clamped() {
        let air = AirProperties::default();
        let kind = MaterialKind::OctaveBandAbsorption {
            bands: vec![125.0, 1000.0],
            alpha: vec![0.2, 0.6],
        };
        let y = kind.admittance(&grid(), &air).unwrap();
        let low = absorption_to_admittance(0.2, air.characteristic_impedance());
        let high = absorption_to_admittance(0.6, air.characteristic_impedance());
        assert_relative_eq!(y[0].re, low.re);
        assert_relative_eq!(y[5].re, high.re);
    }

    #[test]
    fn test_invalid_absorption_is_rejected() {
        let kind = MaterialKind::NormalIncidenceAbsorption {
            values: vec![1.5; 6],
        };
        assert!(kind.admittance(&grid(), &AirProperties::default()).unwrap_err().is_configuration());
    }

    #[test]
    fn test_boundary_condition_rederive() {
        let air = AirProperties::default();
        let kind = MaterialKind::OctaveBandAbsorption {
            bands: vec![125.0, 1000.0],
            alpha: vec![0.2, 0.6],
        };
        let mut bc = MaterialBoundaryCondition::new(kind, 1, &grid(), &air).unwrap();
        assert!(!bc.is_rigid());
        let shorter = FrequencyGrid::from_values(vec![100.0, 200.0], 343.0).unwrap();
        bc.rederive(&shorter, &air).unwrap();
        assert_eq!(bc.admittance.len(), 2);
        assert!(MaterialBoundaryCondition::rigid(0, 2).is_rigid());
    }

    #[test]
    fn test_serde_tagging() {
        let kind = MaterialKind::Porous(PorousLayer {
            flow_resistivity: 10_000.0,
            thickness: 0.1,
        });
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("\"type\":\"porous\""));
        let back: MaterialKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}
