//! Analysis frequencies and their wavenumbers

use serde::{Deserialize, Serialize};

use crate::core::constants::PI2;
use crate::core::error::{BemError, Result};

/// Ascending analysis frequencies with wavenumbers `k = 2πf / c0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyGrid {
    frequencies: Vec<f64>,
    wavenumbers: Vec<f64>,
    sound_speed: f64,
}

impl FrequencyGrid {
    /// `init, init + step, ...` up to and including the last value below
    /// `end + step`
    pub fn from_range(init: f64, end: f64, step: f64, sound_speed: f64) -> Result<Self> {
        if !(init.is_finite() && init > 0.0) {
            return Err(BemError::config(format!("first frequency must be positive, got {init}")));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(BemError::config(format!("frequency step must be positive, got {step}")));
        }
        if !(end.is_finite() && end >= init) {
            return Err(BemError::config(format!(
                "last frequency {end} must not be below the first {init}"
            )));
        }

        // relative slack keeps `end` itself when (end - init)/step is integral
        let count = ((end + step - init) / step - 1e-9).ceil().max(1.0) as usize;
        let frequencies = (0..count).map(|i| init + i as f64 * step).collect();
        Self::from_values(frequencies, sound_speed)
    }

    /// Caller-supplied frequencies, kept as given
    pub fn from_values(frequencies: Vec<f64>, sound_speed: f64) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(BemError::config("frequency grid is empty"));
        }
        if let Some(f) = frequencies.iter().find(|f| !(f.is_finite() && **f > 0.0)) {
            return Err(BemError::config(format!("frequencies must be positive, got {f}")));
        }
        if frequencies.windows(2).any(|w| w[1] <= w[0]) {
            return Err(BemError::config("frequencies must be strictly ascending"));
        }
        if !(sound_speed.is_finite() && sound_speed > 0.0) {
            return Err(BemError::config(format!(
                "sound speed must be positive, got {sound_speed}"
            )));
        }

        let wavenumbers = frequencies.iter().map(|f| PI2 * f / sound_speed).collect();
        Ok(Self {
            frequencies,
            wavenumbers,
            sound_speed,
        })
    }

    /// Recompute the wavenumbers for a new speed of sound
    pub fn update_sound_speed(&mut self, sound_speed: f64) {
        self.sound_speed = sound_speed;
        self.wavenumbers = self
            .frequencies
            .iter()
            .map(|f| PI2 * f / sound_speed)
            .collect();
    }

    /// Frequencies (Hz)
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Wavenumbers (rad/m)
    pub fn wavenumbers(&self) -> &[f64] {
        &self.wavenumbers
    }

    /// Angular frequencies ω = 2πf
    pub fn angular_frequencies(&self) -> Vec<f64> {
        self.frequencies.iter().map(|f| PI2 * f).collect()
    }

    /// Speed of sound the wavenumbers were derived with
    pub fn sound_speed(&self) -> f64 {
        self.sound_speed
    }

    /// Number of frequencies
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Always false for a constructed grid
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Piecewise-linear interpolation of a band table at `x`
///
/// Values outside the table are held at the first/last entry. `bands` must
/// be ascending and as long as `values`.
pub fn interpolate_clamped(bands: &[f64], values: &[f64], x: f64) -> f64 {
    let (Some(&first), Some(&last)) = (bands.first(), bands.last()) else {
        return f64::NAN;
    };
    if x <= first {
        return values[0];
    }
    if x >= last {
        return values[values.len() - 1];
    }
    let upper = bands.partition_point(|b| *b <= x).min(bands.len() - 1);
    let lower = upper - 1;
    let t = (x - bands[lower]) / (bands[upper] - bands[lower]);
    values[lower] + t * (values[upper] - values[lower])
}

/// Validate a band table for [`interpolate_clamped`]
pub(crate) fn validate_band_table(bands: &[f64], values: &[f64], what: &str) -> Result<()> {
    if bands.is_empty() || bands.len() != values.len() {
        return Err(BemError::config(format!(
            "{what}: {} bands for {} values",
            bands.len(),
            values.len()
        )));
    }
    if bands.windows(2).any(|w| w[1] <= w[0]) {
        return Err(BemError::config(format!("{what}: bands must be strictly ascending")));
    }
    Ok(())
}

impl std::fmt::Display for FrequencyGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.frequencies.first(), self.frequencies.last()) {
            (Some(first), Some(last)) => write!(
                f,
                "{} frequencies from {} Hz to {} Hz",
                self.frequencies.len(),
                first,
                last
            ),
            _ => write!(f, "empty frequency grid"),
        }
    }
}
