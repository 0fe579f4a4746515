//! Simulation outputs

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::bem_solver::BoundaryFieldSolution;
use crate::core::error::Result;
use crate::core::postprocess::{spl_db, FieldPoint};

/// Pressure at a receiver for one frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureSample {
    /// Field scattered by the boundary
    pub scattered: Complex64,
    /// Free-field contribution of the source
    pub incident: Complex64,
    /// Sum of both
    pub total: Complex64,
}

impl PressureSample {
    /// Total level in dB SPL
    pub fn spl_db(&self) -> f64 {
        spl_db(self.total)
    }
}

impl From<FieldPoint> for PressureSample {
    fn from(point: FieldPoint) -> Self {
        Self {
            scattered: point.p_scattered,
            incident: point.p_incident,
            total: point.p_total,
        }
    }
}

/// Frequency response of one (receiver, source) pair
///
/// One slot per grid frequency; slots of failed frequencies stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverPressureRecord {
    /// Receiver index in the session
    pub receiver_index: usize,
    /// Source index in the session
    pub source_index: usize,
    /// Receiver position (m)
    pub position: [f64; 3],
    /// Pressure per frequency
    pub samples: Vec<Option<PressureSample>>,
}

impl ReceiverPressureRecord {
    /// Record with every slot empty
    pub fn empty(receiver_index: usize, source_index: usize, position: [f64; 3], num_frequencies: usize) -> Self {
        Self {
            receiver_index,
            source_index,
            position,
            samples: vec![None; num_frequencies],
        }
    }

    /// Total pressure per frequency
    pub fn total(&self) -> Vec<Option<Complex64>> {
        self.samples.iter().map(|s| s.map(|s| s.total)).collect()
    }

    /// SPL per frequency
    pub fn spl_db(&self) -> Vec<Option<f64>> {
        self.samples.iter().map(|s| s.map(|s| s.spl_db())).collect()
    }

    /// Whether every slot has been written
    pub fn is_complete(&self) -> bool {
        self.samples.iter().all(Option::is_some)
    }
}

/// Outcome of one frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrequencyStatus {
    /// Every source solved
    Solved {
        /// Largest GMRES iteration count over the sources
        iterations: usize,
        /// Largest final residual over the sources
        residual: f64,
    },
    /// Skipped after an error
    Failed {
        /// Error message
        error: String,
    },
}

impl FrequencyStatus {
    /// Whether the frequency was solved
    pub fn is_solved(&self) -> bool {
        matches!(self, FrequencyStatus::Solved { .. })
    }
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    /// Grid frequencies (Hz)
    pub frequencies: Vec<f64>,
    /// Outcome per frequency
    pub status: Vec<FrequencyStatus>,
    /// One record per (receiver, source), receiver-major
    pub receivers: Vec<ReceiverPressureRecord>,
    /// Boundary solutions in frequency then source order, when retained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<Vec<BoundaryFieldSolution>>,
}

impl SimulationResults {
    /// Record of a (receiver, source) pair
    pub fn record(&self, receiver_index: usize, source_index: usize) -> Option<&ReceiverPressureRecord> {
        self.receivers
            .iter()
            .find(|r| r.receiver_index == receiver_index && r.source_index == source_index)
    }

    /// Retained boundary solutions of `source_index`, in frequency order
    pub fn boundary_solutions(&self, source_index: usize) -> Vec<&BoundaryFieldSolution> {
        self.boundary
            .iter()
            .flatten()
            .filter(|s| s.source_index == source_index)
            .collect()
    }

    /// Indices of frequencies that failed
    pub fn failed_frequencies(&self) -> Vec<usize> {
        self.status
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_solved())
            .map(|(i, _)| i)
            .collect()
    }

    /// Write as pretty JSON
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Read back from JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_slots() {
        let mut record = ReceiverPressureRecord::empty(0, 1, [1.0, 0.0, 0.0], 3);
        assert!(!record.is_complete());
        let sample = PressureSample::from(FieldPoint::new(
            [1.0, 0.0, 0.0],
            Complex64::new(1.0, 0.0),
            Complex64::new(0.5, 0.0),
        ));
        record.samples[1] = Some(sample);
        assert_eq!(record.total(), vec![None, Some(Complex64::new(1.5, 0.0)), None]);
        assert!(record.spl_db()[1].is_some_and(|l| l > 90.0));
    }

    #[test]
    fn test_status_serialization() {
        let status = FrequencyStatus::Failed {
            error: "boom".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        let back: FrequencyStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
        assert!(!back.is_solved());
    }
}
