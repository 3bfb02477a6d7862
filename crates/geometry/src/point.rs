//! 2D point type (vehicle or world frame, meters)

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point in meters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate (longitudinal)
    pub x: f64,
    /// Y coordinate (lateral)
    pub y: f64,
}

impl Point2D {
    /// Create a new point
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin
    pub const ZERO: Point2D = Point2D { x: 0.0, y: 0.0 };

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance (avoids sqrt)
    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// 2D cross product (z component of the 3D cross product)
    #[inline]
    pub fn cross(&self, other: &Point2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Both coordinates finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2D {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point2D::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point2D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point2D::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self {
        Point2D::new(self.x * scalar, self.y * scalar)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Point2D::new(x, y)
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Point2D::new(x, y)
    }
}

/// Cross product of (b - a) and (p - a); positive when p is left of a->b
#[inline]
pub(crate) fn orient(a: Point2D, b: Point2D, p: Point2D) -> f64 {
    (b - a).cross(&(p - a))
}
