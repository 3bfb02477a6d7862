//! Evaluation Error Types

use association::AssociationError;
use geometry::GeometryError;
use ground_truth::GroundTruthError;
use signal_trace::TraceError;
use thiserror::Error;

/// Errors that abort a single test step
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// A required reader, file or signal was not provided
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Ground truth error: {0}")]
    GroundTruth(#[from] GroundTruthError),

    #[error("Association error: {0}")]
    Association(#[from] AssociationError),

    /// Data present but unusable
    #[error("Invalid data: {0}")]
    Invalid(String),
}

impl EvaluationError {
    /// Whether the step should be reported as INPUT_MISSING rather than DATA_NOK
    pub fn is_missing_input(&self) -> bool {
        match self {
            EvaluationError::MissingInput(_) => true,
            EvaluationError::Trace(err) => err.is_missing_input(),
            _ => false,
        }
    }
}
