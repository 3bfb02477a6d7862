//! Greedy one-to-one association

use crate::config::{AssociationConfig, Strategy};
use crate::object::{Detection, TrackObject};
use crate::score::{distance_score, overlap_score};
use crate::AssociationError;
use geometry::Transform2D;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// One detection-to-track pairing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub detection_id: u32,
    pub track_id: u32,
    /// Overlap score or squared distance, depending on the strategy
    pub score: f64,
}

/// Association of one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssociationResult {
    /// Pairings in detection order
    pub matches: Vec<Match>,
    /// Detections left without a track
    pub unmatched_detections: Vec<u32>,
    /// Tracks no detection claimed
    pub unmatched_tracks: Vec<u32>,
}

impl AssociationResult {
    /// Track associated with a detection
    pub fn track_for(&self, detection_id: u32) -> Option<u32> {
        self.matches
            .iter()
            .find(|m| m.detection_id == detection_id)
            .map(|m| m.track_id)
    }

    /// Detection associated with a track
    pub fn detection_for(&self, track_id: u32) -> Option<u32> {
        self.matches
            .iter()
            .find(|m| m.track_id == track_id)
            .map(|m| m.detection_id)
    }

    /// Detection id -> associated track id (or none) for every detection
    pub fn as_map(&self) -> BTreeMap<u32, Option<u32>> {
        let mut map: BTreeMap<u32, Option<u32>> = self
            .unmatched_detections
            .iter()
            .map(|&id| (id, None))
            .collect();
        for m in &self.matches {
            map.insert(m.detection_id, Some(m.track_id));
        }
        map
    }
}

/// Greedy associator.
///
/// Detections are processed in input order. Each takes the strictly best
/// scoring track that is still unclaimed; equal scores go to the earlier
/// track. A claimed track is unavailable for the rest of the pass. Nothing is
/// kept between calls.
#[derive(Debug, Clone, Default)]
pub struct Associator {
    config: AssociationConfig,
}

impl Associator {
    /// Create a new associator
    pub fn new(config: AssociationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &AssociationConfig {
        &self.config
    }

    /// Pair score under the configured strategy
    pub fn score(&self, detection: &Detection, track: &TrackObject) -> Option<f64> {
        match self.config.strategy {
            Strategy::Overlap => overlap_score(detection, track, &self.config),
            Strategy::Nearest => distance_score(detection, track, &self.config),
        }
    }

    /// Associate detections with tracks of the same frame
    pub fn associate(
        &self,
        detections: &[Detection],
        tracks: &[TrackObject],
    ) -> Result<AssociationResult, AssociationError> {
        ensure_unique(detections.iter().map(|d| d.id), "detection")?;
        ensure_unique(tracks.iter().map(|t| t.id), "track")?;

        let strategy = self.config.strategy;
        let mut claimed = vec![false; tracks.len()];
        let mut result = AssociationResult::default();

        for detection in detections {
            let mut best: Option<(usize, f64)> = None;
            for (idx, track) in tracks.iter().enumerate() {
                if claimed[idx] {
                    continue;
                }
                let Some(score) = self.score(detection, track) else {
                    continue;
                };
                let better = match best {
                    None => true,
                    Some((_, best_score)) => strategy.is_better(score, best_score),
                };
                if better {
                    best = Some((idx, score));
                }
            }

            match best {
                Some((idx, score)) => {
                    claimed[idx] = true;
                    debug!(
                        "Associated detection {} -> track {} (score {:.3})",
                        detection.id, tracks[idx].id, score
                    );
                    result.matches.push(Match {
                        detection_id: detection.id,
                        track_id: tracks[idx].id,
                        score,
                    });
                }
                None => result.unmatched_detections.push(detection.id),
            }
        }

        result.unmatched_tracks = tracks
            .iter()
            .zip(&claimed)
            .filter(|(_, &c)| !c)
            .map(|(t, _)| t.id)
            .collect();
        Ok(result)
    }

    /// Associate after moving prior-frame tracks into the current frame
    pub fn associate_with_motion(
        &self,
        detections: &[Detection],
        prior_tracks: &[TrackObject],
        motion: &Transform2D,
    ) -> Result<AssociationResult, AssociationError> {
        let moved = prior_tracks
            .iter()
            .map(|t| -> Result<TrackObject, AssociationError> {
                Ok(TrackObject {
                    id: t.id,
                    class: t.class,
                    shape: t.shape.transformed(motion)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.associate(detections, &moved)
    }
}

fn ensure_unique(ids: impl Iterator<Item = u32>, kind: &'static str) -> Result<(), AssociationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AssociationError::DuplicateId { kind, id });
        }
    }
    Ok(())
}
