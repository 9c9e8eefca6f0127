//! Error types for diffpool operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for diffpool operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while comparing images and pooling their error maps.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Failed to load an image file.
    #[error("Image load failed: {path}: {reason}")]
    ImageLoad {
        /// Path to the image that failed to load.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Image dimensions don't match between reference and test images.
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height).
        expected: (usize, usize),
        /// Actual dimensions (width, height).
        actual: (usize, usize),
    },

    /// Malformed input to the pooling engine or evaluator.
    ///
    /// Non-finite error values, a zero bin count, percentile fractions outside
    /// `[0, 1]` and merges between pools of different resolution all land here.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A statistic was requested from a pool that has seen no values.
    #[error("Statistics requested from an empty pool")]
    EmptyPool,

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
