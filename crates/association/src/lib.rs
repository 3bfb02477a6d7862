//! Detection-to-Track Association
//!
//! Matches detections (raw tracks, simulated outputs) against existing tracks
//! (fused tracks, ground-truth objects) one frame at a time:
//! - Overlap-ratio scoring for footprints
//! - Nearest-neighbour scoring for point objects
//! - Greedy one-to-one assignment with class gating

mod config;
mod matcher;
mod object;
mod score;

pub use config::{AssociationConfig, Strategy};
pub use matcher::{AssociationResult, Associator, Match};
pub use object::{Detection, ObjectClass, Shape, TrackObject};
pub use score::{distance_score, overlap_score};

use geometry::GeometryError;
use thiserror::Error;

/// Association error types
#[derive(Error, Debug)]
pub enum AssociationError {
    #[error("Duplicate {kind} id {id} in one frame")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}
