//! Ground Truth Error Types

use geometry::GeometryError;
use thiserror::Error;

/// Errors while building or loading ground truth
#[derive(Debug, Error)]
pub enum GroundTruthError {
    /// Track without samples
    #[error("Ground-truth object {0} has no samples")]
    EmptyTrack(u32),

    /// Two samples of one object share a timestamp
    #[error("Ground-truth object {id} has two samples at t={timestamp}")]
    DuplicateTimestamp { id: u32, timestamp: f64 },

    /// Sample with NaN or infinite values
    #[error("Ground-truth object {id} has a non-finite sample at index {index}")]
    NonFiniteSample { id: u32, index: usize },

    /// Two tracks with the same id
    #[error("Ground-truth object id {0} appears twice")]
    DuplicateObject(u32),

    /// Invalid outline
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// File could not be read or parsed
    #[error("Invalid ground-truth data: {0}")]
    InvalidFormat(String),
}

impl From<std::io::Error> for GroundTruthError {
    fn from(err: std::io::Error) -> Self {
        GroundTruthError::InvalidFormat(err.to_string())
    }
}

impl From<serde_json::Error> for GroundTruthError {
    fn from(err: serde_json::Error) -> Self {
        GroundTruthError::InvalidFormat(err.to_string())
    }
}
