//! Observation points

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use sea_wave::Point;

use crate::core::error::{BemError, Result};

/// Head-related multipole description attached to a binaural receiver
///
/// Stored with the receiver so that downstream tools can render ear
/// signals; the field itself is evaluated at the head centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinauralDescriptor {
    /// Expansion order
    pub order: usize,
    /// Frequencies the coefficients are given at
    pub frequencies: Vec<f64>,
    /// Left ear coefficients, one row per frequency
    pub left: Vec<Vec<Complex64>>,
    /// Right ear coefficients, one row per frequency
    pub right: Vec<Vec<Complex64>>,
}

/// Receiver flavour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReceiverKind {
    /// Pressure microphone
    #[default]
    Omni,
    /// Listener with a head descriptor and a viewing azimuth (degrees)
    Binaural {
        /// Ear descriptor
        descriptor: BinauralDescriptor,
        /// Viewing direction in the horizontal plane
        azimuth_deg: f64,
    },
}

/// Point where the pressure is reconstructed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    /// Position (m)
    pub position: [f64; 3],
    /// Flavour
    #[serde(default)]
    pub kind: ReceiverKind,
}

impl Receiver {
    /// Omnidirectional receiver at `position`
    pub fn omni(position: [f64; 3]) -> Self {
        Self {
            position,
            kind: ReceiverKind::Omni,
        }
    }

    /// Binaural receiver at `position`
    pub fn binaural(position: [f64; 3], descriptor: BinauralDescriptor, azimuth_deg: f64) -> Self {
        Self {
            position,
            kind: ReceiverKind::Binaural {
                descriptor,
                azimuth_deg,
            },
        }
    }

    /// Position as a point
    pub fn point(&self) -> Point {
        Point::from_array(self.position)
    }

    /// Positions must be finite
    pub fn validate(&self) -> Result<()> {
        if self.position.iter().all(|c| c.is_finite()) {
            Ok(())
        } else {
            Err(BemError::config(format!(
                "receiver position {:?} is not finite",
                self.position
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receiver_defaults_to_omni() {
        let r: Receiver = serde_json::from_str(r#"{"position": [1.0, 2.0, 3.0]}"#).unwrap();
        assert_eq!(r, Receiver::omni([1.0, 2.0, 3.0]));
        assert_eq!(r.point(), Point::new(1.0, 2.0, 3.0));
        assert!(Receiver::omni([f64::NAN, 0.0, 0.0]).validate().is_err());
    }
}
