//! Polygon footprints of detected objects and parking boxes

use crate::clip::{clip_convex, is_convex_ring, ring_area, signed_ring_area, triangulate};
use crate::point::Point2D;
use crate::GeometryError;
use serde::{Deserialize, Serialize};

/// Intersection areas at or below this (m²) are clipping noise, not overlap
pub const OVERLAP_EPS: f64 = 1e-9;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point2D,
    pub max: Point2D,
}

impl BoundingBox {
    /// Whether two boxes share any area or boundary
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

/// A simple polygon with at least three vertices.
///
/// Vertices are stored counter-clockwise without a repeated closing vertex;
/// clockwise input is reversed on construction. Consecutive duplicate
/// vertices are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point2D>", into = "Vec<Point2D>")]
pub struct Polygon {
    vertices: Vec<Point2D>,
    area: f64,
    convex: bool,
}

impl Polygon {
    /// Build a polygon from an ordered vertex list
    pub fn new(vertices: Vec<Point2D>) -> Result<Self, GeometryError> {
        if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(GeometryError::NonFiniteVertex(index));
        }

        let mut ring: Vec<Point2D> = Vec::with_capacity(vertices.len());
        for v in vertices {
            if ring.last() != Some(&v) {
                ring.push(v);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(GeometryError::TooFewVertices(ring.len()));
        }

        let signed = signed_ring_area(&ring);
        if signed.abs() <= f64::EPSILON {
            return Err(GeometryError::ZeroArea);
        }
        if signed < 0.0 {
            ring.reverse();
        }
        let convex = is_convex_ring(&ring);

        Ok(Self {
            vertices: ring,
            area: signed.abs(),
            convex,
        })
    }

    /// Build a polygon from per-object vertex columns.
    ///
    /// Only the first `used_count` entries are used, mirroring the
    /// "used vertex count" field logged next to fixed-size vertex arrays.
    pub fn from_vertex_columns(xs: &[f64], ys: &[f64], used_count: usize) -> Result<Self, GeometryError> {
        let available = xs.len().min(ys.len());
        if used_count > available {
            return Err(GeometryError::VertexCountExceeded {
                used: used_count,
                available,
            });
        }
        let vertices = xs
            .iter()
            .zip(ys)
            .take(used_count)
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        Self::new(vertices)
    }

    /// Axis-aligned rectangle from its corners
    pub fn rectangle(min: Point2D, max: Point2D) -> Result<Self, GeometryError> {
        Self::new(vec![
            min,
            Point2D::new(max.x, min.y),
            max,
            Point2D::new(min.x, max.y),
        ])
    }

    /// Counter-clockwise vertices
    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    /// Enclosed area (m²)
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Whether the polygon is convex
    pub fn is_convex(&self) -> bool {
        self.convex
    }

    /// Area-weighted centroid
    pub fn centroid(&self) -> Point2D {
        let n = self.vertices.len();
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let w = a.cross(&b);
            cx += (a.x + b.x) * w;
            cy += (a.y + b.y) * w;
        }
        let factor = 1.0 / (6.0 * self.area);
        Point2D::new(cx * factor, cy * factor)
    }

    /// Bounding box of the vertices
    pub fn bounding_box(&self) -> BoundingBox {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for v in &self.vertices[1..] {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
        }
        BoundingBox { min, max }
    }

    /// Point-in-polygon test (even-odd rule, boundary not guaranteed)
    pub fn contains(&self, point: &Point2D) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
                if point.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Triangles covering the polygon
    pub fn triangulate(&self) -> Vec<[Point2D; 3]> {
        if self.convex {
            (1..self.vertices.len() - 1)
                .map(|k| [self.vertices[0], self.vertices[k], self.vertices[k + 1]])
                .collect()
        } else {
            triangulate(&self.vertices)
        }
    }

    /// Area of the intersection with another polygon (m²)
    pub fn intersection_area(&self, other: &Polygon) -> f64 {
        if !self.bounding_box().intersects(&other.bounding_box()) {
            return 0.0;
        }
        let area = if other.convex {
            ring_area(&clip_convex(&self.vertices, &other.vertices))
        } else if self.convex {
            ring_area(&clip_convex(&other.vertices, &self.vertices))
        } else {
            other
                .triangulate()
                .iter()
                .map(|triangle| ring_area(&clip_convex(&self.vertices, triangle)))
                .sum()
        };
        // clipping noise can exceed the true bound by a few ulps
        area.min(self.area).min(other.area)
    }

    /// Whether the polygons share a non-zero area
    pub fn overlaps(&self, other: &Polygon) -> bool {
        self.intersection_area(other) > OVERLAP_EPS
    }
}

impl TryFrom<Vec<Point2D>> for Polygon {
    type Error = GeometryError;

    fn try_from(vertices: Vec<Point2D>) -> Result<Self, Self::Error> {
        Polygon::new(vertices)
    }
}

impl From<Polygon> for Vec<Point2D> {
    fn from(polygon: Polygon) -> Self {
        polygon.vertices
    }
}
