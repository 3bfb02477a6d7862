//! Planar Geometry
//!
//! Geometry primitives for object footprints and parking boxes:
//! - Points and rigid transforms (relative ego motion)
//! - Simple polygons with area, centroid and containment
//! - Polygon intersection area for convex and concave shapes

mod clip;
mod point;
mod polygon;
mod transform;

pub use point::Point2D;
pub use polygon::{BoundingBox, Polygon, OVERLAP_EPS};
pub use transform::Transform2D;

use thiserror::Error;

/// Geometry error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Polygon needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),

    #[error("Polygon has zero area")]
    ZeroArea,

    #[error("Vertex {0} has a non-finite coordinate")]
    NonFiniteVertex(usize),

    #[error("Used vertex count {used} exceeds the {available} logged vertices")]
    VertexCountExceeded { used: usize, available: usize },
}
