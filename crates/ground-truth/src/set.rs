//! Ground-truth object collection for one recording

use crate::error::GroundTruthError;
use crate::track::{GroundTruthState, GroundTruthTrack};
use geometry::Transform2D;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// All ground-truth tracks of one recording
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSet")]
pub struct GroundTruthSet {
    objects: Vec<GroundTruthTrack>,
}

#[derive(Deserialize)]
struct RawSet {
    objects: Vec<GroundTruthTrack>,
}

impl TryFrom<RawSet> for GroundTruthSet {
    type Error = GroundTruthError;

    fn try_from(raw: RawSet) -> Result<Self, Self::Error> {
        GroundTruthSet::new(raw.objects)
    }
}

impl GroundTruthSet {
    /// Build a set; object ids must be unique
    pub fn new(objects: Vec<GroundTruthTrack>) -> Result<Self, GroundTruthError> {
        let mut seen = HashSet::new();
        for track in &objects {
            if !seen.insert(track.id()) {
                return Err(GroundTruthError::DuplicateObject(track.id()));
            }
        }
        Ok(Self { objects })
    }

    /// Load from a JSON document
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, GroundTruthError> {
        let set: GroundTruthSet = serde_json::from_reader(reader)?;
        debug!("Loaded {} ground-truth objects", set.len());
        Ok(set)
    }

    /// Load from a JSON file
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, GroundTruthError> {
        let path = path.as_ref();
        info!("Loading ground truth from {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    /// Tracks in input order
    pub fn objects(&self) -> &[GroundTruthTrack] {
        &self.objects
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if set is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Interpolated state of every object present at `t`.
    ///
    /// Objects whose sample range does not cover `t` are left out.
    pub fn pool_at(&self, t: f64) -> Vec<GroundTruthState> {
        self.objects
            .iter()
            .filter_map(|track| track.interpolate(t))
            .collect()
    }

    /// Like `pool_at`, with every state moved by `motion`
    pub fn pool_at_with_motion(&self, t: f64, motion: &Transform2D) -> Vec<GroundTruthState> {
        self.objects
            .iter()
            .filter_map(|track| track.interpolate(t))
            .map(|state| state.transformed(motion))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::GroundTruthSample;
    use association::ObjectClass;
    use geometry::Point2D;

    const JSON: &str = r#"{
        "objects": [
            { "id": 1, "class": "vehicle", "samples": [
                { "t": 0.0, "x": 0.0, "y": 0.0, "vx": 1.0, "vy": 0.0 },
                { "t": 2.0, "x": 2.0, "y": 0.0, "vx": 1.0, "vy": 0.0 }
            ] },
            { "id": 2, "class": "pedestrian", "samples": [
                { "t": 1.5, "x": 5.0, "y": 5.0 },
                { "t": 4.0, "x": 5.0, "y": 10.0 }
            ] },
            { "id": 3, "samples": [ { "t": 1.0, "x": -3.0, "y": 1.0 } ] }
        ]
    }"#;

    #[test]
    fn test_load_json() {
        let set = GroundTruthSet::from_json_reader(JSON.as_bytes()).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.objects()[1].class(), ObjectClass::Pedestrian);
        assert_eq!(set.objects()[2].class(), ObjectClass::Unknown);
    }

    #[test]
    fn test_pool_excludes_objects_out_of_range() {
        let set = GroundTruthSet::from_json_reader(JSON.as_bytes()).unwrap();

        let ids = |t: f64| set.pool_at(t).iter().map(|s| s.id).collect::<Vec<_>>();
        assert_eq!(ids(0.5), vec![1]);
        assert_eq!(ids(1.0), vec![1, 3]);
        assert_eq!(ids(1.75), vec![1, 2]);
        assert_eq!(ids(3.0), vec![2]);
        assert!(ids(5.0).is_empty());
    }

    #[test]
    fn test_pool_with_motion() {
        let set = GroundTruthSet::from_json_reader(JSON.as_bytes()).unwrap();
        let pool = set.pool_at_with_motion(1.0, &Transform2D::new(0.0, -1.0, 0.0));
        assert_eq!(pool[0].position, Point2D::new(0.0, 0.0));
        assert_eq!(pool[1].position, Point2D::new(-4.0, 1.0));
    }

    #[test]
    fn test_rejects_duplicate_objects() {
        let track = GroundTruthTrack::new(
            7,
            ObjectClass::Vehicle,
            vec![GroundTruthSample::new(0.0, 0.0, 0.0)],
        )
        .unwrap();
        assert!(matches!(
            GroundTruthSet::new(vec![track.clone(), track]),
            Err(GroundTruthError::DuplicateObject(7))
        ));
    }

    #[test]
    fn test_load_rejects_invalid_track() {
        let json = r#"{ "objects": [ { "id": 1, "class": "vehicle", "samples": [] } ] }"#;
        assert!(GroundTruthSet::from_json_reader(json.as_bytes()).is_err());
    }
}
