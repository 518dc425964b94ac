//! Error types for compress-eval operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for compress-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while evaluating compression strategies.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The source image could not be opened or decoded.
    #[error("Input unreadable: {path}: {reason}")]
    InputUnreadable {
        /// Path to the image that failed to load.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A single strategy failed to encode, write or decode its artifact.
    #[error("Strategy failed ({strategy}): {reason}")]
    StrategyFailed {
        /// Name of the strategy.
        strategy: String,
        /// Reason for the failure.
        reason: String,
    },

    /// Metric inputs have different dimensions.
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height).
        expected: (usize, usize),
        /// Actual dimensions (width, height).
        actual: (usize, usize),
    },

    /// The report could not be persisted.
    #[error("Report write failed: {path}: {reason}")]
    ReportWriteFailed {
        /// Report file that could not be written.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error from the image library.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Wrap any error as a failure of the named strategy.
    pub fn strategy(strategy: &str, reason: impl std::fmt::Display) -> Self {
        Self::StrategyFailed {
            strategy: strategy.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Name of the pipeline stage that produced this error.
    #[must_use]
    pub fn stage(&self) -> String {
        match self {
            Self::InputUnreadable { .. } => "input".to_string(),
            Self::StrategyFailed { strategy, .. } => format!("strategy '{strategy}'"),
            Self::DimensionMismatch { .. } => "metrics".to_string(),
            Self::ReportWriteFailed { .. } | Self::Json(_) | Self::Csv(_) => "report".to_string(),
            Self::Io(_) | Self::Image(_) => "io".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_error_names_stage() {
        let err = Error::strategy("PNG Max", "encoder rejected input");
        assert_eq!(err.stage(), "strategy 'PNG Max'");
        assert_eq!(
            err.to_string(),
            "Strategy failed (PNG Max): encoder rejected input"
        );
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = Error::DimensionMismatch {
            expected: (100, 100),
            actual: (50, 50),
        };
        assert_eq!(err.stage(), "metrics");
        assert!(err.to_string().contains("(50, 50)"));
    }
}
