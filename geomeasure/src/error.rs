//! Error types used by the crate.

use thiserror::Error;

/// Geomeasure error type.
#[derive(Debug, Error)]
pub enum GeomeasureError {
    /// Error decoding data.
    #[error("failed to decode data")]
    Decoding(#[from] serde_json::Error),
    /// Background worker stopped without finishing its job.
    #[error("background worker failed: {0}")]
    Worker(String),
}

impl From<tokio::task::JoinError> for GeomeasureError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Worker(value.to_string())
    }
}
