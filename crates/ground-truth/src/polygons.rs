//! Side-loaded polygon frames (ground-truth and simulated footprints)

use crate::error::GroundTruthError;
use geometry::{GeometryError, Polygon};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Outline as logged: fixed vertex array plus the number of vertices in use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectOutline {
    /// Object id (optional for ground truth)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,

    /// Vertex array `[[x, y], ...]`
    pub vertices: Vec<[f64; 2]>,

    /// Number of leading vertices in use; all when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_vertices: Option<usize>,
}

impl ObjectOutline {
    /// Outline using every vertex
    pub fn new(id: Option<u32>, vertices: Vec<[f64; 2]>) -> Self {
        Self {
            id,
            vertices,
            used_vertices: None,
        }
    }

    /// Build the polygon from the used vertices
    pub fn polygon(&self) -> Result<Polygon, GeometryError> {
        let xs: Vec<f64> = self.vertices.iter().map(|v| v[0]).collect();
        let ys: Vec<f64> = self.vertices.iter().map(|v| v[1]).collect();
        let used = self.used_vertices.unwrap_or(self.vertices.len());
        Polygon::from_vertex_columns(&xs, &ys, used)
    }
}

/// Ground-truth and simulated outlines of one timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonFrame {
    pub timestamp: f64,
    #[serde(default)]
    pub ground_truth: Vec<ObjectOutline>,
    #[serde(default)]
    pub simulated: Vec<ObjectOutline>,
}

/// All polygon frames of one recording, sorted by timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonFrames {
    pub frames: Vec<PolygonFrame>,
}

impl PolygonFrames {
    /// Wrap frames, sorting them by timestamp
    pub fn new(mut frames: Vec<PolygonFrame>) -> Self {
        frames.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { frames }
    }

    /// Load from a JSON document
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, GroundTruthError> {
        let raw: PolygonFrames = serde_json::from_reader(reader)?;
        Ok(Self::new(raw.frames))
    }

    /// Load from a JSON file
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, GroundTruthError> {
        let path = path.as_ref();
        info!("Loading polygon frames from {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if there are no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
