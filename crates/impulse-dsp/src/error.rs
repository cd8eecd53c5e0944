//! Error types for DSP operations.

use thiserror::Error;

/// Errors that can occur during DSP operations.
#[derive(Debug, Error)]
pub enum DspError {
    /// Transform length must be positive.
    #[error("Transform length must be positive, got {0}")]
    InvalidLength(usize),

    /// Input length mismatch.
    #[error("Input length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Malformed parameter (band edges, weights, tap counts, ratios).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Insufficient data for operation.
    #[error("Insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Numerical instability detected.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// The execution backend rejected a transform.
    #[error("FFT execution failed: {0}")]
    ExecutionFailure(String),
}

impl DspError {
    /// Shorthand for [`DspError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether the error stems from caller input rather than execution.
    ///
    /// These are programming errors: retrying with the same input cannot succeed.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidLength(_)
                | Self::LengthMismatch { .. }
                | Self::InvalidArgument(_)
                | Self::InsufficientData { .. }
        )
    }
}

/// Result type for DSP operations.
pub type DspResult<T> = Result<T, DspError>;
