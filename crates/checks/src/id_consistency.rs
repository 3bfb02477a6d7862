//! Object-ID consistency over overlapping outlines
//!
//! Per frame every simulated outline is intersected with every ground-truth
//! outline. All simulated outlines covering one ground-truth obstacle must
//! carry one ID, and one ID must not cover two different obstacles.

use crate::recording::Recording;
use geometry::{Polygon, OVERLAP_EPS};
use ground_truth::PolygonFrame;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};
use verdict::{escape_html, ChartSpec, EvaluationError, StepInfo, StepResult, TestStep};

/// Reason of an ID inconsistency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdIssueReason {
    /// One ID assigned to two different ground-truth obstacles
    DuplicateIdSameFrame,
    /// Outlines covering one obstacle disagree on the ID
    DifferentIdSameObstacle,
}

impl IdIssueReason {
    pub fn as_str(self) -> &'static str {
        match self {
            IdIssueReason::DuplicateIdSameFrame => "DUPLICATE_ID_SAME_FRAME",
            IdIssueReason::DifferentIdSameObstacle => "DIFFERENT_ID_SAME_OBSTACLE",
        }
    }
}

impl fmt::Display for IdIssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inconsistency found in a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdIssue {
    pub reason: IdIssueReason,

    /// Simulated IDs involved (sorted)
    pub ids: Vec<u32>,

    /// Indices of the ground-truth outlines involved (sorted)
    pub ground_truth: Vec<usize>,
}

/// Result of checking one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// No ground truth or no simulated output; not evaluated
    Skipped,
    Consistent,
    Inconsistent(Vec<IdIssue>),
}

impl FrameOutcome {
    pub fn is_consistent(&self) -> bool {
        matches!(self, FrameOutcome::Consistent)
    }

    pub fn issues(&self) -> &[IdIssue] {
        match self {
            FrameOutcome::Inconsistent(issues) => issues,
            _ => &[],
        }
    }
}

/// ID check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdCheckConfig {
    /// Intersection area above which two outlines overlap (m²)
    pub min_intersection_area: f64,
}

impl Default for IdCheckConfig {
    fn default() -> Self {
        Self {
            min_intersection_area: OVERLAP_EPS,
        }
    }
}

/// Pairwise overlap checker
#[derive(Debug, Clone, Default)]
pub struct IdConsistencyChecker {
    config: IdCheckConfig,
}

impl IdConsistencyChecker {
    pub fn new(config: IdCheckConfig) -> Self {
        Self { config }
    }

    /// Check one frame of ground-truth polygons against `(id, polygon)` outputs
    pub fn check_frame(&self, ground_truth: &[Polygon], simulated: &[(u32, Polygon)]) -> FrameOutcome {
        if ground_truth.is_empty() || simulated.is_empty() {
            return FrameOutcome::Skipped;
        }

        let mut ids_per_gt: BTreeMap<usize, BTreeSet<u32>> = BTreeMap::new();
        let mut gts_per_id: BTreeMap<u32, BTreeSet<usize>> = BTreeMap::new();

        for (g, gt) in ground_truth.iter().enumerate() {
            for (id, polygon) in simulated {
                if gt.intersection_area(polygon) > self.config.min_intersection_area {
                    ids_per_gt.entry(g).or_default().insert(*id);
                    gts_per_id.entry(*id).or_default().insert(g);
                }
            }
        }

        let mut issues = Vec::new();
        for (g, ids) in &ids_per_gt {
            if ids.len() > 1 {
                issues.push(IdIssue {
                    reason: IdIssueReason::DifferentIdSameObstacle,
                    ids: ids.iter().copied().collect(),
                    ground_truth: vec![*g],
                });
            }
        }
        for (id, gts) in &gts_per_id {
            if gts.len() > 1 {
                issues.push(IdIssue {
                    reason: IdIssueReason::DuplicateIdSameFrame,
                    ids: vec![*id],
                    ground_truth: gts.iter().copied().collect(),
                });
            }
        }

        if issues.is_empty() {
            FrameOutcome::Consistent
        } else {
            FrameOutcome::Inconsistent(issues)
        }
    }

    /// Check a side-loaded frame. Frames with an unusable outline are skipped.
    pub fn check_polygon_frame(&self, frame: &PolygonFrame) -> FrameOutcome {
        let ground_truth = match frame
            .ground_truth
            .iter()
            .map(|o| o.polygon())
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(polygons) => polygons,
            Err(e) => {
                warn!("Skipping frame at t={}: invalid ground-truth outline ({})", frame.timestamp, e);
                return FrameOutcome::Skipped;
            }
        };

        let mut simulated = Vec::with_capacity(frame.simulated.len());
        for outline in &frame.simulated {
            let Some(id) = outline.id else {
                warn!("Skipping frame at t={}: simulated outline without id", frame.timestamp);
                return FrameOutcome::Skipped;
            };
            match outline.polygon() {
                Ok(polygon) => simulated.push((id, polygon)),
                Err(e) => {
                    warn!("Skipping frame at t={}: invalid outline for id {} ({})", frame.timestamp, id, e);
                    return FrameOutcome::Skipped;
                }
            }
        }

        self.check_frame(&ground_truth, &simulated)
    }
}

/// Test step: simulated object IDs are unique per obstacle over the recording
pub struct IdUniquenessStep {
    info: StepInfo,
    checker: IdConsistencyChecker,
}

impl IdUniquenessStep {
    pub fn new(info: StepInfo, config: IdCheckConfig) -> Self {
        Self {
            info,
            checker: IdConsistencyChecker::new(config),
        }
    }
}

impl TestStep<Recording> for IdUniquenessStep {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn evaluate(&self, recording: &Recording) -> Result<StepResult, EvaluationError> {
        let frames = recording.polygons()?;

        let mut evaluated = 0usize;
        let mut failed_frames = 0usize;
        let mut times = Vec::new();
        let mut issue_counts = Vec::new();
        let mut failures: Vec<(f64, f64, IdIssue)> = Vec::new();

        for frame in &frames.frames {
            let outcome = self.checker.check_polygon_frame(frame);
            if outcome == FrameOutcome::Skipped {
                continue;
            }
            let count = outcome.issues().len() as f64;
            evaluated += 1;
            times.push(frame.timestamp);
            issue_counts.push(count);
            if !outcome.issues().is_empty() {
                failed_frames += 1;
            }
            for issue in outcome.issues() {
                failures.push((frame.timestamp, count, issue.clone()));
            }
        }
        debug!(
            "{}: {} of {} frames evaluated, {} issues",
            recording.name,
            evaluated,
            frames.len(),
            failures.len()
        );

        if evaluated == 0 {
            return Ok(StepResult::not_assessed(
                "No frame with both ground-truth and simulated outlines; object IDs not assessed.",
            ));
        }

        let mut chart = ChartSpec::new("Object ID issues per frame").with_trace("issues", &times, &issue_counts);
        for (t, count, issue) in &failures {
            chart.add_marker(*t, *count, issue.reason.as_str());
        }

        if failures.is_empty() {
            return Ok(StepResult::pass(format!(
                "Object IDs consistent in all {} evaluated frames.",
                evaluated
            ))
            .with_chart(chart));
        }

        let mut text = format!(
            "Object IDs inconsistent in {} of {} evaluated frames:<ul>",
            failed_frames, evaluated
        );
        for (t, _, issue) in &failures {
            text.push_str(&format!(
                "<li>t={:.3}s: <b>{}</b> ids {} on ground-truth objects {}</li>",
                t,
                issue.reason,
                escape_html(&format!("{:?}", issue.ids)),
                escape_html(&format!("{:?}", issue.ground_truth)),
            ));
        }
        text.push_str("</ul>");

        Ok(StepResult::fail(text).with_chart(chart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry::Point2D;
    use ground_truth::{ObjectOutline, PolygonFrames};
    use proptest::prelude::*;
    use verdict::{run_safely, Verdict};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::rectangle(Point2D::new(x0, y0), Point2D::new(x1, y1)).unwrap()
    }

    fn outline(id: Option<u32>, x0: f64, y0: f64, x1: f64, y1: f64) -> ObjectOutline {
        ObjectOutline::new(id, vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
    }

    fn step() -> IdUniquenessStep {
        IdUniquenessStep::new(
            StepInfo::new("REQ-OBJ-ID", "TC_UNIQUE_ID", "static object IDs are unique"),
            IdCheckConfig::default(),
        )
    }

    fn two_obstacle_recording(second_id: u32) -> Recording {
        let frame = PolygonFrame {
            timestamp: 1.0,
            ground_truth: vec![outline(None, 0.0, 0.0, 2.0, 2.0), outline(None, 10.0, 0.0, 12.0, 2.0)],
            simulated: vec![
                outline(Some(5), 0.5, 0.5, 2.5, 2.5),
                outline(Some(second_id), 9.5, 0.5, 11.5, 2.5),
            ],
        };
        Recording::new("rec").with_polygons(PolygonFrames::new(vec![frame]))
    }

    #[test]
    fn test_distinct_ids_pass() {
        let result = run_safely(&step(), &two_obstacle_recording(7));
        assert_eq!(result.verdict, Verdict::Pass);
    }

    #[test]
    fn test_shared_id_fails_with_duplicate() {
        let result = run_safely(&step(), &two_obstacle_recording(5));
        assert_eq!(result.verdict, Verdict::Fail);
        assert!(result.evaluation.contains("DUPLICATE_ID_SAME_FRAME"));
    }

    #[test]
    fn test_different_ids_same_obstacle() {
        let checker = IdConsistencyChecker::default();
        let gt = vec![rect(0.0, 0.0, 4.0, 2.0)];
        let sim = vec![(1, rect(0.0, 0.0, 2.0, 2.0)), (2, rect(2.5, 0.0, 4.0, 2.0))];
        let outcome = checker.check_frame(&gt, &sim);
        assert_eq!(
            outcome.issues(),
            &[IdIssue {
                reason: IdIssueReason::DifferentIdSameObstacle,
                ids: vec![1, 2],
                ground_truth: vec![0],
            }]
        );
    }

    #[test]
    fn test_touching_outlines_do_not_overlap() {
        let checker = IdConsistencyChecker::default();
        let gt = vec![rect(0.0, 0.0, 2.0, 2.0)];
        let sim = vec![(1, rect(0.0, 0.0, 2.0, 2.0)), (2, rect(2.0, 0.0, 4.0, 2.0))];
        assert!(checker.check_frame(&gt, &sim).is_consistent());
    }

    #[test]
    fn test_empty_frames_skipped() {
        let checker = IdConsistencyChecker::default();
        assert_eq!(checker.check_frame(&[], &[(1, rect(0.0, 0.0, 1.0, 1.0))]), FrameOutcome::Skipped);
        assert_eq!(checker.check_frame(&[rect(0.0, 0.0, 1.0, 1.0)], &[]), FrameOutcome::Skipped);

        let recording = Recording::new("rec").with_polygons(PolygonFrames::new(vec![PolygonFrame {
            timestamp: 0.0,
            ground_truth: vec![outline(None, 0.0, 0.0, 1.0, 1.0)],
            simulated: vec![],
        }]));
        assert_eq!(run_safely(&step(), &recording).verdict, Verdict::NotAssessed);
    }

    #[test]
    fn test_invalid_outline_skips_frame() {
        let checker = IdConsistencyChecker::default();
        let frame = PolygonFrame {
            timestamp: 0.0,
            ground_truth: vec![outline(None, 0.0, 0.0, 1.0, 1.0)],
            simulated: vec![ObjectOutline::new(Some(1), vec![[0.0, 0.0], [1.0, 1.0]])],
        };
        assert_eq!(checker.check_polygon_frame(&frame), FrameOutcome::Skipped);
    }

    #[test]
    fn test_missing_polygons_is_input_missing() {
        let result = run_safely(&step(), &Recording::new("rec"));
        assert_eq!(result.verdict, Verdict::InputMissing);
    }

    proptest! {
        #[test]
        fn prop_same_obstacle_inconsistent_iff_distinct_ids(ids in prop::collection::vec(1u32..4, 1..6)) {
            let checker = IdConsistencyChecker::default();
            let gt = vec![rect(0.0, 0.0, 10.0, 2.0)];
            let sim: Vec<(u32, Polygon)> = ids
                .iter()
                .enumerate()
                .map(|(i, &id)| (id, rect(i as f64, 0.5, i as f64 + 1.5, 1.5)))
                .collect();
            let distinct: BTreeSet<u32> = ids.iter().copied().collect();
            let outcome = checker.check_frame(&gt, &sim);
            prop_assert_eq!(!outcome.is_consistent(), distinct.len() >= 2);
        }

        #[test]
        fn prop_shared_id_on_two_obstacles_is_duplicate(id in 0u32..1000, gap in 1.0f64..50.0) {
            let checker = IdConsistencyChecker::default();
            let gt = vec![rect(0.0, 0.0, 2.0, 2.0), rect(2.0 + gap, 0.0, 4.0 + gap, 2.0)];
            let sim = vec![
                (id, rect(0.5, 0.5, 1.5, 1.5)),
                (id, rect(2.5 + gap, 0.5, 3.5 + gap, 1.5)),
            ];
            let outcome = checker.check_frame(&gt, &sim);
            prop_assert!(outcome
                .issues()
                .iter()
                .any(|i| i.reason == IdIssueReason::DuplicateIdSameFrame && i.ids == vec![id]));
        }
    }
}
