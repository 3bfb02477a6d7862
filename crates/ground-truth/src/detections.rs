//! Side-loaded detection frames (sensor output to compare against ground truth)

use crate::error::GroundTruthError;
use association::Detection;
use geometry::Transform2D;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Detections reported at one timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    pub timestamp: f64,

    /// Motion that brings ground truth into this frame's coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ego_motion: Option<Transform2D>,

    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// All detection frames of one recording, sorted by timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrames {
    pub frames: Vec<DetectionFrame>,
}

impl DetectionFrames {
    /// Wrap frames, sorting them by timestamp
    pub fn new(mut frames: Vec<DetectionFrame>) -> Self {
        frames.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { frames }
    }

    /// Load from a JSON document
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, GroundTruthError> {
        let raw: DetectionFrames = serde_json::from_reader(reader)?;
        Ok(Self::new(raw.frames))
    }

    /// Load from a JSON file
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, GroundTruthError> {
        let path = path.as_ref();
        info!("Loading detection frames from {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use association::{ObjectClass, Shape};

    #[test]
    fn test_load_detection_frames() {
        let json = r#"{ "frames": [
            { "timestamp": 0.5, "detections": [
                { "id": 3, "class": "pedestrian", "shape": { "point": { "x": 1.0, "y": 2.0 } } }
            ] },
            { "timestamp": 0.1, "ego_motion": { "yaw": 0.0, "tx": -0.5, "ty": 0.0 } }
        ] }"#;
        let frames = DetectionFrames::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames.frames[0].timestamp, 0.1);
        assert!(frames.frames[0].detections.is_empty());
        assert_eq!(frames.frames[0].ego_motion.map(|m| m.tx), Some(-0.5));

        let detection = &frames.frames[1].detections[0];
        assert_eq!(detection.class, ObjectClass::Pedestrian);
        assert!(matches!(detection.shape, Shape::Point(p) if p.x == 1.0 && p.y == 2.0));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            DetectionFrames::from_json_reader("{ \"frames\": 3 }".as_bytes()),
            Err(GroundTruthError::InvalidFormat(_))
        ));
    }
}
