//! Ground Truth
//!
//! Reference data side-loaded next to a recording:
//! - Per-object timestamped tracks with linear interpolation
//! - Object pools at arbitrary query times
//! - Ground-truth and simulated outline frames
//! - Detection frames to score against the ground truth

mod detections;
mod error;
mod polygons;
mod set;
mod track;

pub use detections::{DetectionFrame, DetectionFrames};
pub use error::GroundTruthError;
pub use polygons::{ObjectOutline, PolygonFrame, PolygonFrames};
pub use set::GroundTruthSet;
pub use track::{GroundTruthSample, GroundTruthState, GroundTruthTrack};
