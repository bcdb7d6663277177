//! Error types for the bev-eval library.

use thiserror::Error;

/// Result type for bev-eval operations.
pub type Result<T> = std::result::Result<T, BevEvalError>;

/// Error types that can occur while converting or scoring boxes.
#[derive(Error, Debug)]
pub enum BevEvalError {
    /// An array did not have the expected shape, or a designated axis was not of size 2.
    #[error("Shape error: {0}")]
    ShapeError(String),

    /// Invalid IoU threshold set.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// A configuration value is out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<ndarray::ShapeError> for BevEvalError {
    fn from(err: ndarray::ShapeError) -> Self {
        BevEvalError::ShapeError(err.to_string())
    }
}
