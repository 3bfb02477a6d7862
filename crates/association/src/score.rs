//! Pairwise association scores
//!
//! A score of `None` means the pair must never be associated.

use crate::config::AssociationConfig;
use crate::object::{Detection, TrackObject};

/// Overlap score: sum of both overlap ratios.
///
/// `None` when classes differ, either shape has no footprint, or either
/// ratio (`intersection / own area`) does not exceed `min_overlap_ratio`.
pub fn overlap_score(detection: &Detection, track: &TrackObject, config: &AssociationConfig) -> Option<f64> {
    if detection.class != track.class {
        return None;
    }
    let det_poly = detection.shape.polygon()?;
    let trk_poly = track.shape.polygon()?;

    let intersection = det_poly.intersection_area(trk_poly);
    let det_ratio = intersection / det_poly.area();
    let trk_ratio = intersection / trk_poly.area();

    if det_ratio > config.min_overlap_ratio && trk_ratio > config.min_overlap_ratio {
        Some(det_ratio + trk_ratio)
    } else {
        None
    }
}

/// Distance score: squared distance between reference positions.
///
/// `None` when classes differ or the distance is not below `max_distance_squared`.
pub fn distance_score(detection: &Detection, track: &TrackObject, config: &AssociationConfig) -> Option<f64> {
    if detection.class != track.class {
        return None;
    }
    let d2 = detection
        .shape
        .position()
        .distance_squared(&track.shape.position());
    (d2 < config.max_distance_squared).then_some(d2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectClass;
    use geometry::{Point2D, Polygon};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::rectangle(Point2D::new(x0, y0), Point2D::new(x1, y1)).unwrap()
    }

    #[test]
    fn test_overlap_score_requires_both_ratios() {
        let config = AssociationConfig::default();
        let track = TrackObject::polygon(1, ObjectClass::Vehicle, rect(0.0, 0.0, 4.0, 2.0));

        let same = Detection::polygon(10, ObjectClass::Vehicle, rect(0.0, 0.0, 4.0, 2.0));
        assert!((overlap_score(&same, &track, &config).unwrap() - 2.0).abs() < 1e-9);

        // detection fully inside but covers only half of the track
        let small = Detection::polygon(11, ObjectClass::Vehicle, rect(0.0, 0.0, 2.0, 2.0));
        assert!(overlap_score(&small, &track, &config).is_none());

        let shifted = Detection::polygon(12, ObjectClass::Vehicle, rect(0.4, 0.0, 4.4, 2.0));
        let score = overlap_score(&shifted, &track, &config).unwrap();
        assert!((score - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_class_mismatch_never_scores() {
        let config = AssociationConfig::default();
        let shape = rect(0.0, 0.0, 1.0, 1.0);
        let track = TrackObject::polygon(1, ObjectClass::Pedestrian, shape.clone());
        let det = Detection::polygon(2, ObjectClass::Vehicle, shape);
        assert_eq!(overlap_score(&det, &track, &config), None);
        assert_eq!(distance_score(&det, &track, &config), None);
    }

    #[test]
    fn test_distance_score_is_strict() {
        let config = AssociationConfig::default();
        let track = TrackObject::point(1, ObjectClass::Pedestrian, Point2D::new(0.0, 0.0));
        let near = Detection::point(2, ObjectClass::Pedestrian, Point2D::new(1.0, 0.0));
        assert_eq!(distance_score(&near, &track, &config), Some(1.0));

        // exactly on the gate (1² + 1² = 2.0) is rejected
        let edge = Detection::point(3, ObjectClass::Pedestrian, Point2D::new(1.0, 1.0));
        assert_eq!(distance_score(&edge, &track, &config), None);
    }

    #[test]
    fn test_point_shapes_have_no_overlap_score() {
        let config = AssociationConfig::default();
        let track = TrackObject::point(1, ObjectClass::Vehicle, Point2D::ZERO);
        let det = Detection::polygon(2, ObjectClass::Vehicle, rect(-1.0, -1.0, 1.0, 1.0));
        assert_eq!(overlap_score(&det, &track, &config), None);
    }
}
