//! JSON configuration of a simulation

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::session::{RunOptions, Session};
use crate::core::air::AirProperties;
use crate::core::error::Result;
use crate::core::frequency::FrequencyGrid;
use crate::core::material::MaterialKind;
use crate::core::mesh::SurfaceMesh;
use crate::core::receiver::Receiver;
use crate::core::source::{GridPolicy, SourceSpec};
use crate::testing::{icosphere, shoebox};

/// Complete simulation description loaded from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Air
    #[serde(default)]
    pub air: AirConfig,
    /// Frequency grid
    pub frequencies: FrequencyConfig,
    /// Boundary surface
    pub mesh: MeshConfig,
    /// One material per region, in region order; empty means rigid
    #[serde(default)]
    pub materials: Vec<MaterialKind>,
    /// Sources
    pub sources: Vec<SourceSpec>,
    /// What to do with directivity descriptors on another grid
    #[serde(default)]
    pub grid_policy: GridPolicy,
    /// Receivers
    #[serde(default)]
    pub receivers: Vec<Receiver>,
    /// Solver settings
    #[serde(default)]
    pub solver: RunOptions,
}

/// Air configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AirConfig {
    /// Direct sound speed and density
    Properties {
        /// Speed of sound (m/s)
        sound_speed: f64,
        /// Density (kg/m³)
        density: f64,
    },
    /// Derived from ambient conditions
    Conditions {
        /// Temperature (°C)
        temperature: f64,
        /// Relative humidity (%)
        humidity: f64,
        /// Atmospheric pressure (Pa)
        atmospheric_pressure: f64,
    },
}

impl Default for AirConfig {
    fn default() -> Self {
        let air = AirProperties::default();
        AirConfig::Properties {
            sound_speed: air.sound_speed,
            density: air.density,
        }
    }
}

impl AirConfig {
    /// Convert to AirProperties
    pub fn to_air(&self) -> Result<AirProperties> {
        match *self {
            AirConfig::Properties { sound_speed, density } => AirProperties::new(sound_speed, density),
            AirConfig::Conditions {
                temperature,
                humidity,
                atmospheric_pressure,
            } => Ok(AirProperties::from_conditions(temperature, humidity, atmospheric_pressure)),
        }
    }
}

/// Frequency grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrequencyConfig {
    /// `init, init + step, …` up to `end`
    Range {
        /// First frequency (Hz)
        init: f64,
        /// Last frequency (Hz)
        end: f64,
        /// Step (Hz)
        step: f64,
    },
    /// Explicit list
    Values {
        /// Frequencies (Hz), strictly ascending
        values: Vec<f64>,
    },
}

impl FrequencyConfig {
    /// Convert to a grid at speed of sound `c0`
    pub fn to_grid(&self, c0: f64) -> Result<FrequencyGrid> {
        match self {
            FrequencyConfig::Range { init, end, step } => FrequencyGrid::from_range(*init, *end, *step, c0),
            FrequencyConfig::Values { values } => FrequencyGrid::from_values(values.clone(), c0),
        }
    }
}

/// Mesh configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeshConfig {
    /// Vertices, triangles and region ids given inline
    Inline {
        /// Vertex coordinates
        vertices: Vec<[f64; 3]>,
        /// Vertex indices per triangle
        triangles: Vec<[usize; 3]>,
        /// Region per triangle
        regions: Vec<usize>,
    },
    /// Sphere centred at the origin
    Icosphere {
        /// Radius (m)
        radius: f64,
        /// Subdivision level
        subdivisions: usize,
        /// Scatterer (normals into the sphere) rather than enclosure
        #[serde(default)]
        exterior: bool,
    },
    /// Box room with one region per face
    Shoebox {
        /// Dimensions along x, y, z (m)
        dimensions: [f64; 3],
        /// Maximum element edge along each axis (m)
        element_size: f64,
    },
}

impl MeshConfig {
    /// Build the surface mesh
    pub fn to_mesh(&self) -> Result<SurfaceMesh> {
        match self {
            MeshConfig::Inline {
                vertices,
                triangles,
                regions,
            } => SurfaceMesh::new(vertices.clone(), triangles.clone(), regions.clone()),
            MeshConfig::Icosphere {
                radius,
                subdivisions,
                exterior,
            } => {
                let mesh = icosphere(*radius, *subdivisions)?;
                Ok(if *exterior { mesh.flipped() } else { mesh })
            }
            MeshConfig::Shoebox {
                dimensions,
                element_size,
            } => shoebox(*dimensions, *element_size),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Build a session
    pub fn to_session(&self) -> Result<Session> {
        let air = self.air.to_air()?;
        let mut session = Session::new(air);
        session.set_frequencies(self.frequencies.to_grid(air.sound_speed)?)?;
        session.set_mesh(self.mesh.to_mesh()?)?;
        for kind in &self.materials {
            session.add_material(kind.clone())?;
        }
        for spec in &self.sources {
            session.add_source(spec.clone(), self.grid_policy)?;
        }
        for receiver in &self.receivers {
            session.add_receiver(receiver.clone())?;
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn sample() -> SimulationConfig {
        SimulationConfig {
            air: AirConfig::Conditions {
                temperature: 20.0,
                humidity: 50.0,
                atmospheric_pressure: 101325.0,
            },
            frequencies: FrequencyConfig::Range {
                init: 50.0,
                end: 80.0,
                step: 10.0,
            },
            mesh: MeshConfig::Shoebox {
                dimensions: [3.0, 2.0, 2.5],
                element_size: 1.0,
            },
            materials: vec![
                MaterialKind::OctaveBandAbsorption {
                    bands: vec![63.0, 125.0],
                    alpha: vec![0.1, 0.2],
                },
                MaterialKind::Rigid,
                MaterialKind::Rigid,
                MaterialKind::Rigid,
                MaterialKind::Rigid,
                MaterialKind::Admittance {
                    values: vec![Complex64::new(1e-3, 0.0); 4],
                },
            ],
            sources: vec![SourceSpec::monopole([1.0, 1.0, 1.2])],
            grid_policy: GridPolicy::Reject,
            receivers: vec![Receiver::omni([2.0, 1.0, 1.2])],
            solver: RunOptions::default(),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let config = sample();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"type\": \"octave_band_absorption\""));
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_to_session() {
        let session = sample().to_session().unwrap();
        assert_eq!(session.grid().unwrap().len(), 4);
        assert_eq!(session.materials().len(), 6);
        assert_eq!(session.sources().len(), 1);
        assert!(session.validate().is_ok());
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "frequencies": {"type": "values", "values": [100.0]},
            "mesh": {"type": "icosphere", "radius": 0.5, "subdivisions": 1, "exterior": true},
            "sources": [{"type": "monopole", "position": [2.0, 0.0, 0.0]}]
        }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.air, AirConfig::default());
        assert_eq!(config.solver, RunOptions::default());
        assert!(config.materials.is_empty());
        let session = config.to_session().unwrap();
        assert!(session.validate().is_ok());
    }
}
