//! Objects taking part in association

use geometry::{GeometryError, Point2D, Polygon, Transform2D};
use serde::{Deserialize, Serialize};

/// Object class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    Vehicle,
    Truck,
    Pedestrian,
    Cyclist,
    Motorcycle,
    Animal,
    Static,
    #[serde(other)]
    Unknown,
}

/// Spatial extent of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Point object (position only)
    Point(Point2D),
    /// Footprint polygon
    Polygon(Polygon),
}

impl Shape {
    /// Reference position: the point itself or the polygon centroid
    pub fn position(&self) -> Point2D {
        match self {
            Shape::Point(p) => *p,
            Shape::Polygon(polygon) => polygon.centroid(),
        }
    }

    /// Footprint if the shape has one
    pub fn polygon(&self) -> Option<&Polygon> {
        match self {
            Shape::Point(_) => None,
            Shape::Polygon(polygon) => Some(polygon),
        }
    }

    /// Move the shape with a rigid transform
    pub fn transformed(&self, transform: &Transform2D) -> Result<Shape, GeometryError> {
        Ok(match self {
            Shape::Point(p) => Shape::Point(transform.apply(*p)),
            Shape::Polygon(polygon) => Shape::Polygon(transform.apply_polygon(polygon)?),
        })
    }
}

/// Existing track (fused track or ground-truth object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackObject {
    /// Track identifier
    pub id: u32,

    /// Object class
    pub class: ObjectClass,

    /// Position or footprint
    pub shape: Shape,
}

/// Detection to be associated (raw track or simulated output)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Detection identifier
    pub id: u32,

    /// Object class
    pub class: ObjectClass,

    /// Position or footprint
    pub shape: Shape,
}

impl TrackObject {
    /// Point track
    pub fn point(id: u32, class: ObjectClass, position: Point2D) -> Self {
        Self {
            id,
            class,
            shape: Shape::Point(position),
        }
    }

    /// Polygon track
    pub fn polygon(id: u32, class: ObjectClass, polygon: Polygon) -> Self {
        Self {
            id,
            class,
            shape: Shape::Polygon(polygon),
        }
    }
}

impl Detection {
    /// Point detection
    pub fn point(id: u32, class: ObjectClass, position: Point2D) -> Self {
        Self {
            id,
            class,
            shape: Shape::Point(position),
        }
    }

    /// Polygon detection
    pub fn polygon(id: u32, class: ObjectClass, polygon: Polygon) -> Self {
        Self {
            id,
            class,
            shape: Shape::Polygon(polygon),
        }
    }
}
