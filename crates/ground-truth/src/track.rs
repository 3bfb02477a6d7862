//! Per-object ground-truth tracks and linear interpolation

use crate::error::GroundTruthError;
use association::{ObjectClass, TrackObject};
use geometry::{Point2D, Transform2D};
use serde::{Deserialize, Serialize};

/// One timestamped ground-truth sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthSample {
    /// Sample time (s)
    #[serde(rename = "t")]
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vy: Option<f64>,
}

impl GroundTruthSample {
    /// Position-only sample
    pub fn new(timestamp: f64, x: f64, y: f64) -> Self {
        Self {
            timestamp,
            x,
            y,
            vx: None,
            vy: None,
        }
    }

    /// Builder-style setter for the velocity
    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = Some(vx);
        self.vy = Some(vy);
        self
    }

    fn velocity(&self) -> Option<Point2D> {
        Some(Point2D::new(self.vx?, self.vy?))
    }

    fn is_finite(&self) -> bool {
        self.timestamp.is_finite()
            && self.x.is_finite()
            && self.y.is_finite()
            && self.vx.map_or(true, f64::is_finite)
            && self.vy.map_or(true, f64::is_finite)
    }
}

/// Ground-truth state of one object at a query time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundTruthState {
    pub id: u32,
    pub class: ObjectClass,
    pub timestamp: f64,
    pub position: Point2D,
    /// Present only when both bracketing samples carry a velocity
    pub velocity: Option<Point2D>,
}

impl GroundTruthState {
    /// Move the state into another frame (velocity is rotated only)
    pub fn transformed(&self, transform: &Transform2D) -> Self {
        Self {
            position: transform.apply(self.position),
            velocity: self.velocity.map(|v| transform.rotate(v)),
            ..*self
        }
    }

    /// Point track for association
    pub fn to_track_object(&self) -> TrackObject {
        TrackObject::point(self.id, self.class, self.position)
    }
}

/// Time-sorted samples of one ground-truth object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrack")]
pub struct GroundTruthTrack {
    id: u32,
    class: ObjectClass,
    samples: Vec<GroundTruthSample>,
}

#[derive(Deserialize)]
struct RawTrack {
    id: u32,
    #[serde(default = "unknown_class")]
    class: ObjectClass,
    samples: Vec<GroundTruthSample>,
}

fn unknown_class() -> ObjectClass {
    ObjectClass::Unknown
}

impl TryFrom<RawTrack> for GroundTruthTrack {
    type Error = GroundTruthError;

    fn try_from(raw: RawTrack) -> Result<Self, Self::Error> {
        GroundTruthTrack::new(raw.id, raw.class, raw.samples)
    }
}

impl GroundTruthTrack {
    /// Build a track; samples are sorted by timestamp
    pub fn new(
        id: u32,
        class: ObjectClass,
        mut samples: Vec<GroundTruthSample>,
    ) -> Result<Self, GroundTruthError> {
        if samples.is_empty() {
            return Err(GroundTruthError::EmptyTrack(id));
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(GroundTruthError::NonFiniteSample { id, index });
        }
        samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        if let Some(pair) = samples.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(GroundTruthError::DuplicateTimestamp {
                id,
                timestamp: pair[0].timestamp,
            });
        }
        Ok(Self { id, class, samples })
    }

    /// Object id
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Object class
    pub fn class(&self) -> ObjectClass {
        self.class
    }

    /// Samples sorted by timestamp
    pub fn samples(&self) -> &[GroundTruthSample] {
        &self.samples
    }

    /// Time span covered by the samples
    pub fn time_range(&self) -> (f64, f64) {
        (
            self.samples[0].timestamp,
            self.samples[self.samples.len() - 1].timestamp,
        )
    }

    /// Linearly interpolated state at `t`.
    ///
    /// Returns `None` outside `[first, last]`; no extrapolation. At a sample
    /// timestamp the sample itself is returned.
    pub fn interpolate(&self, t: f64) -> Option<GroundTruthState> {
        let (first, last) = self.time_range();
        if !(t >= first && t <= last) {
            return None;
        }

        // first sample with timestamp >= t
        let upper = self.samples.partition_point(|s| s.timestamp < t);
        let s1 = &self.samples[upper];
        if s1.timestamp == t {
            return Some(self.state(t, Point2D::new(s1.x, s1.y), s1.velocity()));
        }
        let s0 = &self.samples[upper - 1];

        let span = s1.timestamp - s0.timestamp;
        let w0 = (s1.timestamp - t) / span;
        let w1 = (t - s0.timestamp) / span;
        let blend = |a: f64, b: f64| w0 * a + w1 * b;

        let position = Point2D::new(blend(s0.x, s1.x), blend(s0.y, s1.y));
        let velocity = match (s0.velocity(), s1.velocity()) {
            (Some(v0), Some(v1)) => Some(Point2D::new(blend(v0.x, v1.x), blend(v0.y, v1.y))),
            _ => None,
        };
        Some(self.state(t, position, velocity))
    }

    fn state(&self, timestamp: f64, position: Point2D, velocity: Option<Point2D>) -> GroundTruthState {
        GroundTruthState {
            id: self.id,
            class: self.class,
            timestamp,
            position,
            velocity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn track() -> GroundTruthTrack {
        GroundTruthTrack::new(
            4,
            ObjectClass::Pedestrian,
            vec![
                GroundTruthSample::new(2.0, 10.0, 0.0).with_velocity(1.0, 0.0),
                GroundTruthSample::new(1.0, 0.0, 2.0).with_velocity(3.0, 1.0),
                GroundTruthSample::new(3.0, 10.0, 4.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_samples_are_sorted() {
        let track = track();
        assert_eq!(track.time_range(), (1.0, 3.0));
        assert_eq!(track.samples()[0].x, 0.0);
    }

    #[test]
    fn test_exact_at_samples() {
        let track = track();
        let at = track.interpolate(1.0).unwrap();
        assert_eq!(at.position, Point2D::new(0.0, 2.0));
        assert_eq!(at.velocity, Some(Point2D::new(3.0, 1.0)));

        let end = track.interpolate(3.0).unwrap();
        assert_eq!(end.position, Point2D::new(10.0, 4.0));
        assert_eq!(end.velocity, None);
    }

    #[test]
    fn test_weighted_between_samples() {
        let track = track();
        let q = track.interpolate(1.25).unwrap();
        // w0 = 0.75, w1 = 0.25
        assert!((q.position.x - 2.5).abs() < 1e-12);
        assert!((q.position.y - 1.5).abs() < 1e-12);
        let v = q.velocity.unwrap();
        assert!((v.x - 2.5).abs() < 1e-12);
        assert!((v.y - 0.75).abs() < 1e-12);

        // second bracket has no velocity on its upper sample
        assert_eq!(track.interpolate(2.5).unwrap().velocity, None);
    }

    #[test]
    fn test_outside_range_is_absent() {
        let track = track();
        assert!(track.interpolate(0.999).is_none());
        assert!(track.interpolate(3.001).is_none());
        assert!(track.interpolate(f64::NAN).is_none());
    }

    #[test]
    fn test_rejects_bad_tracks() {
        assert!(matches!(
            GroundTruthTrack::new(1, ObjectClass::Vehicle, vec![]),
            Err(GroundTruthError::EmptyTrack(1))
        ));
        assert!(matches!(
            GroundTruthTrack::new(
                2,
                ObjectClass::Vehicle,
                vec![GroundTruthSample::new(1.0, 0.0, 0.0), GroundTruthSample::new(1.0, 1.0, 0.0)]
            ),
            Err(GroundTruthError::DuplicateTimestamp { id: 2, .. })
        ));
        assert!(matches!(
            GroundTruthTrack::new(3, ObjectClass::Vehicle, vec![GroundTruthSample::new(0.0, f64::NAN, 0.0)]),
            Err(GroundTruthError::NonFiniteSample { id: 3, index: 0 })
        ));
    }

    #[test]
    fn test_transformed_state() {
        let state = track().interpolate(1.0).unwrap();
        let moved = state.transformed(&Transform2D::new(0.0, -1.0, 0.5));
        assert_eq!(moved.position, Point2D::new(-1.0, 2.5));
        assert_eq!(moved.velocity, state.velocity);
    }

    proptest! {
        #[test]
        fn prop_interpolation_exact_and_midpoint(
            t0 in -100.0f64..100.0,
            dt in 0.01f64..10.0,
            a in (-50.0f64..50.0, -50.0f64..50.0),
            b in (-50.0f64..50.0, -50.0f64..50.0),
        ) {
            let t1 = t0 + dt;
            let track = GroundTruthTrack::new(
                1,
                ObjectClass::Vehicle,
                vec![GroundTruthSample::new(t0, a.0, a.1), GroundTruthSample::new(t1, b.0, b.1)],
            ).unwrap();

            prop_assert_eq!(track.interpolate(t0).unwrap().position, Point2D::new(a.0, a.1));
            prop_assert_eq!(track.interpolate(t1).unwrap().position, Point2D::new(b.0, b.1));

            let mid = track.interpolate(t0 + (t1 - t0) / 2.0).unwrap().position;
            prop_assert!((mid.x - (a.0 + b.0) / 2.0).abs() < 1e-6);
            prop_assert!((mid.y - (a.1 + b.1) / 2.0).abs() < 1e-6);

            prop_assert!(track.interpolate(t0 - 1e-3).is_none());
            prop_assert!(track.interpolate(t1 + 1e-3).is_none());
        }
    }
}
