//! Signal Trace Error Types

use thiserror::Error;

/// Errors raised while building or querying a signal trace
#[derive(Debug, Error)]
pub enum TraceError {
    /// Signal not present in the trace
    #[error("Signal not found in trace: {0}")]
    MissingSignal(String),

    /// None of the candidate physical paths of a logical signal is present
    #[error("No candidate path for logical signal '{logical}' is present (tried {candidates:?})")]
    UnresolvedSignal {
        logical: String,
        candidates: Vec<String>,
    },

    /// Column length differs from the timestamp count
    #[error("Signal {name} has {actual} samples, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Timestamps must be strictly increasing
    #[error("Timestamps not strictly increasing at index {index} ({previous} -> {current})")]
    NonMonotonic {
        index: usize,
        previous: f64,
        current: f64,
    },

    /// Sample index outside the trace
    #[error("Sample index {index} out of range for trace of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Trace file could not be read or parsed
    #[error("Invalid trace data: {0}")]
    InvalidFormat(String),
}

impl TraceError {
    /// Whether the error means a required input is absent rather than broken
    pub fn is_missing_input(&self) -> bool {
        matches!(
            self,
            TraceError::MissingSignal(_) | TraceError::UnresolvedSignal { .. }
        )
    }
}

impl From<std::io::Error> for TraceError {
    fn from(err: std::io::Error) -> Self {
        TraceError::InvalidFormat(err.to_string())
    }
}

impl From<serde_json::Error> for TraceError {
    fn from(err: serde_json::Error) -> Self {
        TraceError::InvalidFormat(err.to_string())
    }
}
