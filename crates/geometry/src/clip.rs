//! Polygon clipping and triangulation
//!
//! Intersection area of two simple polygons is computed by clipping one
//! polygon against convex pieces of the other (Sutherland–Hodgman) and
//! summing the clipped areas. The convex pieces are the polygon itself when
//! it is convex, otherwise its ear-clipping triangles.

use crate::point::{orient, Point2D};

/// Tolerance for orientation tests
const ORIENT_EPS: f64 = 1e-12;

/// Absolute shoelace area of an open vertex ring
pub(crate) fn ring_area(ring: &[Point2D]) -> f64 {
    signed_ring_area(ring).abs()
}

/// Shoelace formula; positive for counter-clockwise rings
pub(crate) fn signed_ring_area(ring: &[Point2D]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        sum += a.cross(&b);
    }
    sum / 2.0
}

/// Clip `subject` against a convex counter-clockwise `clip` ring.
///
/// `subject` may be concave; the output can then contain zero-width
/// bridges, which do not change its area.
pub(crate) fn clip_convex(subject: &[Point2D], clip: &[Point2D]) -> Vec<Point2D> {
    let mut output: Vec<Point2D> = subject.to_vec();
    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }
        let a = clip[i];
        let b = clip[(i + 1) % clip.len()];
        let input = std::mem::take(&mut output);

        let mut prev = input[input.len() - 1];
        let mut prev_inside = orient(a, b, prev) >= -ORIENT_EPS;
        for &curr in &input {
            let curr_inside = orient(a, b, curr) >= -ORIENT_EPS;
            if curr_inside {
                if !prev_inside {
                    output.push(line_intersection(prev, curr, a, b));
                }
                output.push(curr);
            } else if prev_inside {
                output.push(line_intersection(prev, curr, a, b));
            }
            prev = curr;
            prev_inside = curr_inside;
        }
    }
    output
}

/// Intersection of segment p->q with the infinite line a->b
fn line_intersection(p: Point2D, q: Point2D, a: Point2D, b: Point2D) -> Point2D {
    let dp = orient(a, b, p);
    let dq = orient(a, b, q);
    let denom = dp - dq;
    if denom.abs() < f64::EPSILON {
        return q;
    }
    let t = dp / denom;
    p + (q - p) * t
}

/// Ear-clipping triangulation of a simple counter-clockwise ring
pub(crate) fn triangulate(ring: &[Point2D]) -> Vec<[Point2D; 3]> {
    let mut indices: Vec<usize> = (0..ring.len()).collect();
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));

    while indices.len() > 3 {
        let n = indices.len();
        let mut ear = None;
        for i in 0..n {
            let a = ring[indices[(i + n - 1) % n]];
            let b = ring[indices[i]];
            let c = ring[indices[(i + 1) % n]];
            if orient(a, b, c) <= ORIENT_EPS {
                continue; // reflex or collinear
            }
            let blocked = indices.iter().any(|&k| {
                let p = ring[k];
                p != a && p != b && p != c && in_triangle(p, a, b, c)
            });
            if !blocked {
                ear = Some(i);
                break;
            }
        }

        match ear {
            Some(i) => {
                let a = ring[indices[(i + n - 1) % n]];
                let b = ring[indices[i]];
                let c = ring[indices[(i + 1) % n]];
                triangles.push([a, b, c]);
                indices.remove(i);
            }
            None => {
                // not a simple ring (or fully collinear leftovers); fan the rest
                for k in 1..n - 1 {
                    triangles.push([ring[indices[0]], ring[indices[k]], ring[indices[k + 1]]]);
                }
                return triangles;
            }
        }
    }

    if indices.len() == 3 {
        triangles.push([ring[indices[0]], ring[indices[1]], ring[indices[2]]]);
    }
    triangles
}

fn in_triangle(p: Point2D, a: Point2D, b: Point2D, c: Point2D) -> bool {
    orient(a, b, p) >= -ORIENT_EPS && orient(b, c, p) >= -ORIENT_EPS && orient(c, a, p) >= -ORIENT_EPS
}

/// Whether a counter-clockwise ring is convex
pub(crate) fn is_convex_ring(ring: &[Point2D]) -> bool {
    let n = ring.len();
    (0..n).all(|i| orient(ring[i], ring[(i + 1) % n], ring[(i + 2) % n]) >= -ORIENT_EPS)
}
