//! Ground-truth detection rate
//!
//! For every detection frame the ground-truth pool is interpolated at the
//! frame timestamp, optionally moved with the frame's ego motion, and
//! associated 1:1 with the detections by nearest neighbour.

use crate::recording::Recording;
use association::{AssociationConfig, Associator, Strategy, TrackObject};
use ground_truth::{DetectionFrame, GroundTruthSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use verdict::{ChartSpec, EvaluationError, StepInfo, StepResult, TestStep};

/// Detection rate step configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionRateConfig {
    #[serde(flatten)]
    pub info: StepInfo,

    /// Minimum share of ground-truth objects that must be detected
    pub min_detection_rate: f64,

    /// Move the ground truth with the frame's ego motion when present
    pub use_ego_motion: bool,
}

impl Default for DetectionRateConfig {
    fn default() -> Self {
        Self {
            info: StepInfo::new("", "DETECTION_RATE", "ground-truth objects are detected"),
            min_detection_rate: 0.9,
            use_ego_motion: true,
        }
    }
}

/// Counts for one evaluated frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDetection {
    pub timestamp: f64,

    /// Ground-truth objects present
    pub expected: usize,

    /// Ground-truth objects associated with a detection
    pub detected: usize,

    /// Ids of ground-truth objects without detection
    pub missed: Vec<u32>,
}

/// Test step: share of ground-truth objects associated with a detection
pub struct DetectionRateStep {
    config: DetectionRateConfig,
    associator: Associator,
}

impl DetectionRateStep {
    /// The association gate is taken from `association`; the strategy is always nearest neighbour
    pub fn new(config: DetectionRateConfig, association: AssociationConfig) -> Self {
        Self {
            config,
            associator: Associator::new(association.with_strategy(Strategy::Nearest)),
        }
    }

    /// Evaluate one frame; `None` when no ground truth is present at its timestamp
    pub fn evaluate_frame(
        &self,
        ground_truth: &GroundTruthSet,
        frame: &DetectionFrame,
    ) -> Result<Option<FrameDetection>, EvaluationError> {
        let pool = match (self.config.use_ego_motion, frame.ego_motion.as_ref()) {
            (true, Some(motion)) => ground_truth.pool_at_with_motion(frame.timestamp, motion),
            _ => ground_truth.pool_at(frame.timestamp),
        };
        if pool.is_empty() {
            return Ok(None);
        }

        let tracks: Vec<TrackObject> = pool.iter().map(|state| state.to_track_object()).collect();
        let result = self.associator.associate(&frame.detections, &tracks)?;

        Ok(Some(FrameDetection {
            timestamp: frame.timestamp,
            expected: tracks.len(),
            detected: result.matches.len(),
            missed: result.unmatched_tracks,
        }))
    }
}

impl TestStep<Recording> for DetectionRateStep {
    fn info(&self) -> &StepInfo {
        &self.config.info
    }

    fn evaluate(&self, recording: &Recording) -> Result<StepResult, EvaluationError> {
        let ground_truth = recording.ground_truth()?;
        let frames = recording.detections()?;

        let mut evaluated = Vec::new();
        for frame in &frames.frames {
            if let Some(counts) = self.evaluate_frame(ground_truth, frame)? {
                evaluated.push(counts);
            }
        }
        debug!(
            "{}: {} of {} detection frames had ground truth",
            recording.name,
            evaluated.len(),
            frames.len()
        );

        if evaluated.is_empty() {
            return Ok(StepResult::not_assessed(
                "No detection frame overlaps the ground-truth time range; detection rate not assessed.",
            ));
        }

        let expected: usize = evaluated.iter().map(|f| f.expected).sum();
        let detected: usize = evaluated.iter().map(|f| f.detected).sum();
        let rate = detected as f64 / expected as f64;

        let times: Vec<f64> = evaluated.iter().map(|f| f.timestamp).collect();
        let rates: Vec<f64> = evaluated
            .iter()
            .map(|f| f.detected as f64 / f.expected as f64)
            .collect();
        let limit = vec![self.config.min_detection_rate; times.len()];
        let chart = ChartSpec::new("Detection rate per frame")
            .with_trace("rate", &times, &rates)
            .with_trace("min_detection_rate", &times, &limit);

        let summary = format!(
            "Detected {} of {} ground-truth objects over {} frames (rate {:.3}, required {:.3}).",
            detected,
            expected,
            evaluated.len(),
            rate,
            self.config.min_detection_rate
        );

        if rate >= self.config.min_detection_rate {
            return Ok(StepResult::pass(summary).with_chart(chart));
        }

        let mut misses: BTreeMap<u32, usize> = BTreeMap::new();
        for frame in &evaluated {
            for &id in &frame.missed {
                *misses.entry(id).or_default() += 1;
            }
        }
        let mut text = summary;
        text.push_str("<ul>");
        for (id, count) in &misses {
            text.push_str(&format!("<li>object {}: missed in {} frames</li>", id, count));
        }
        text.push_str("</ul>");

        Ok(StepResult::fail(text)
            .with_chart(chart)
            .with_detail("detection_rate", format!("{:.3}", rate)))
    }
}
