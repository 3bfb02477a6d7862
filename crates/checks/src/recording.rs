//! Inputs of one recording, shared by all test steps

use ground_truth::{DetectionFrames, GroundTruthSet, PolygonFrames};
use signal_trace::SignalTrace;
use verdict::EvaluationError;

/// Everything loaded for one measurement. Each input is optional; a step
/// asks for what it needs and gets `MissingInput` when it is absent.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    /// Recording name used in logs
    pub name: String,
    pub trace: Option<SignalTrace>,
    pub polygons: Option<PolygonFrames>,
    pub ground_truth: Option<GroundTruthSet>,
    pub detections: Option<DetectionFrames>,
}

impl Recording {
    /// Empty recording
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_trace(mut self, trace: SignalTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn with_polygons(mut self, polygons: PolygonFrames) -> Self {
        self.polygons = Some(polygons);
        self
    }

    pub fn with_ground_truth(mut self, ground_truth: GroundTruthSet) -> Self {
        self.ground_truth = Some(ground_truth);
        self
    }

    pub fn with_detections(mut self, detections: DetectionFrames) -> Self {
        self.detections = Some(detections);
        self
    }

    /// Signal trace or `MissingInput`
    pub fn trace(&self) -> Result<&SignalTrace, EvaluationError> {
        self.trace
            .as_ref()
            .ok_or_else(|| EvaluationError::MissingInput("signal trace".to_string()))
    }

    /// Polygon frames or `MissingInput`
    pub fn polygons(&self) -> Result<&PolygonFrames, EvaluationError> {
        self.polygons
            .as_ref()
            .ok_or_else(|| EvaluationError::MissingInput("polygon frames".to_string()))
    }

    /// Ground-truth set or `MissingInput`
    pub fn ground_truth(&self) -> Result<&GroundTruthSet, EvaluationError> {
        self.ground_truth
            .as_ref()
            .ok_or_else(|| EvaluationError::MissingInput("ground truth".to_string()))
    }

    /// Detection frames or `MissingInput`
    pub fn detections(&self) -> Result<&DetectionFrames, EvaluationError> {
        self.detections
            .as_ref()
            .ok_or_else(|| EvaluationError::MissingInput("detection frames".to_string()))
    }
}
