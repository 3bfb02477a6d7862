//! Rigid 2D transforms (relative ego motion between frames)

use crate::point::Point2D;
use crate::polygon::Polygon;
use crate::GeometryError;
use serde::{Deserialize, Serialize};

/// Rotation by `yaw` (radians, counter-clockwise) followed by a translation.
///
/// Used to bring positions logged in a previous frame's vehicle coordinates
/// into the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// Rotation angle (rad)
    pub yaw: f64,
    /// Translation along x (m)
    pub tx: f64,
    /// Translation along y (m)
    pub ty: f64,
}

impl Transform2D {
    /// Create a new transform
    pub fn new(yaw: f64, tx: f64, ty: f64) -> Self {
        Self { yaw, tx, ty }
    }

    /// Identity transform
    pub const fn identity() -> Self {
        Self {
            yaw: 0.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Transform a position
    #[inline]
    pub fn apply(&self, p: Point2D) -> Point2D {
        let r = self.rotate(p);
        Point2D::new(r.x + self.tx, r.y + self.ty)
    }

    /// Rotate a vector (velocities are not translated)
    #[inline]
    pub fn rotate(&self, v: Point2D) -> Point2D {
        let (s, c) = self.yaw.sin_cos();
        Point2D::new(c * v.x - s * v.y, s * v.x + c * v.y)
    }

    /// Transform every vertex of a polygon
    pub fn apply_polygon(&self, polygon: &Polygon) -> Result<Polygon, GeometryError> {
        Polygon::new(polygon.vertices().iter().map(|&v| self.apply(v)).collect())
    }

    /// Inverse transform
    pub fn inverse(&self) -> Self {
        let back = Transform2D::new(-self.yaw, 0.0, 0.0).rotate(Point2D::new(-self.tx, -self.ty));
        Self::new(-self.yaw, back.x, back.y)
    }

    /// `self ∘ other`: apply `other` first, then `self`
    pub fn compose(&self, other: &Transform2D) -> Self {
        let t = self.apply(Point2D::new(other.tx, other.ty));
        Self::new(self.yaw + other.yaw, t.x, t.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: Point2D, b: Point2D) -> bool {
        a.distance(&b) < 1e-9
    }

    #[test]
    fn test_apply_rotates_then_translates() {
        let t = Transform2D::new(FRAC_PI_2, 1.0, 0.0);
        assert!(close(t.apply(Point2D::new(1.0, 0.0)), Point2D::new(1.0, 1.0)));
        assert!(close(t.rotate(Point2D::new(1.0, 0.0)), Point2D::new(0.0, 1.0)));
    }

    #[test]
    fn test_inverse_and_compose() {
        let t = Transform2D::new(0.3, -2.0, 5.0);
        let p = Point2D::new(3.0, -1.0);
        assert!(close(t.inverse().apply(t.apply(p)), p));

        let u = Transform2D::new(-1.1, 0.5, 0.25);
        assert!(close(t.compose(&u).apply(p), t.apply(u.apply(p))));
    }

    #[test]
    fn test_apply_polygon_preserves_area() {
        let polygon = Polygon::rectangle(Point2D::new(0.0, 0.0), Point2D::new(4.0, 2.0)).unwrap();
        let moved = Transform2D::new(0.7, 10.0, -3.0).apply_polygon(&polygon).unwrap();
        assert!((moved.area() - 8.0).abs() < 1e-9);
    }
}
