//! Error type shared by the solver and the session

use thiserror::Error;

/// Errors raised while configuring or running a simulation
#[derive(Debug, Error)]
pub enum BemError {
    /// Invalid or incomplete inputs, raised at the point of misuse
    #[error("configuration error: {message}")]
    Configuration {
        /// What is wrong
        message: String,
    },

    /// GMRES did not reach the requested tolerance
    #[error(
        "GMRES did not converge at {frequency} Hz (source {source_index}): residual {residual:.3e} after {iterations} iterations"
    )]
    NonConvergence {
        /// Frequency in Hz
        frequency: f64,
        /// Source index in the session
        source_index: usize,
        /// Final relative residual
        residual: f64,
        /// Inner iterations performed
        iterations: usize,
    },

    /// A frequency-aligned table does not match the session grid
    #[error("inconsistent frequency grid for {context}: expected {expected} values, found {found}")]
    InconsistentGrid {
        /// Session grid length
        expected: usize,
        /// Length that was supplied
        found: usize,
        /// Which table was checked
        context: String,
    },

    /// Operator assembly or factorisation failed
    #[error("assembly failed at {frequency} Hz: {message}")]
    Assembly {
        /// Frequency in Hz (0 for frequency-independent parts)
        frequency: f64,
        /// Underlying failure
        message: String,
    },

    /// Reading or writing a file
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Parsing or writing JSON
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BemError {
    /// Shorthand for [`BemError::Configuration`]
    pub fn config(message: impl Into<String>) -> Self {
        BemError::Configuration {
            message: message.into(),
        }
    }

    /// Whether this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, BemError::Configuration { .. })
    }

    /// Whether this is a solver non-convergence
    pub fn is_non_convergence(&self) -> bool {
        matches!(self, BemError::NonConvergence { .. })
    }

    /// Whether this is a grid mismatch
    pub fn is_inconsistent_grid(&self) -> bool {
        matches!(self, BemError::InconsistentGrid { .. })
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, BemError>;

/// Check that a frequency-aligned table has the grid length
pub(crate) fn ensure_grid_len(expected: usize, found: usize, context: &str) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(BemError::InconsistentGrid {
            expected,
            found,
            context: context.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert!(BemError::config("missing grid").is_configuration());
        let err = BemError::NonConvergence {
            frequency: 100.0,
            source_index: 0,
            residual: 1e-3,
            iterations: 3000,
        };
        assert!(err.is_non_convergence());
        assert!(err.to_string().contains("100 Hz"));
    }

    #[test]
    fn test_ensure_grid_len() {
        assert!(ensure_grid_len(3, 3, "q").is_ok());
        let err = ensure_grid_len(3, 2, "q").unwrap_err();
        assert!(err.is_inconsistent_grid());
    }
}
