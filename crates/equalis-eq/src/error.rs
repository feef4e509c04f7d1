//! Error types for equalizer operations.

use thiserror::Error;

/// Errors that can occur while configuring or running the equalizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A band specification is malformed.
    #[error("invalid band {index}: {reason}")]
    InvalidBand {
        /// Position of the band in the request.
        index: usize,
        /// Why the band was rejected.
        reason: String,
    },

    /// Equalizer configuration values are inconsistent.
    #[error("invalid equalizer config: {0}")]
    InvalidConfig(String),

    /// Signal validation or numeric failure from the analysis kernel.
    #[error(transparent)]
    Analysis(#[from] equalis_analysis::Error),
}

impl Error {
    /// Create an invalid band error.
    pub fn invalid_band(index: usize, reason: impl Into<String>) -> Self {
        Error::InvalidBand {
            index,
            reason: reason.into(),
        }
    }
}

/// Convenience result type for equalizer operations.
pub type Result<T> = std::result::Result<T, Error>;
