//! Error types for the analysis kernel.

use thiserror::Error;

/// Errors reported by the analysis kernel.
///
/// Every variant is raised before any computation starts, except
/// [`Error::NumericAnomaly`], which guards results that could not be kept
/// finite.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The input signal has no samples.
    #[error("signal is empty")]
    EmptySignal,

    /// The sample rate is zero, negative, or not finite.
    #[error("sample rate must be positive and finite (got {0})")]
    InvalidSampleRate(f64),

    /// A processing parameter is outside its valid domain.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A result contained NaN or infinity after sanitization.
    #[error("numeric anomaly: {0}")]
    NumericAnomaly(String),
}

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Convenience result type for analysis operations.
pub type Result<T> = std::result::Result<T, Error>;
