//! Signal-processing helpers used by the evaluations
//!
//! All functions work on plain slices so they can be applied to any trace
//! column. Indices returned always refer to the input slice.

use serde::{Deserialize, Serialize};

/// Absolute tolerance used for equality on enum-valued signals
pub const EQ_TOLERANCE: f64 = 1e-6;

/// Predicate on a single sample value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "value")]
pub enum Condition {
    /// Value equals (within `EQ_TOLERANCE`)
    Equals(f64),
    /// Value differs (beyond `EQ_TOLERANCE`)
    NotEquals(f64),
    /// Value strictly above
    Above(f64),
    /// Value strictly below
    Below(f64),
    /// Value within the inclusive range
    InRange(f64, f64),
}

impl Condition {
    /// Evaluate the condition on one value. NaN never satisfies anything.
    pub fn holds(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        match *self {
            Condition::Equals(v) => (value - v).abs() <= EQ_TOLERANCE,
            Condition::NotEquals(v) => (value - v).abs() > EQ_TOLERANCE,
            Condition::Above(v) => value > v,
            Condition::Below(v) => value < v,
            Condition::InRange(lo, hi) => value >= lo && value <= hi,
        }
    }

    /// Short human readable form, e.g. `== 3` or `> 0.5`
    pub fn describe(&self) -> String {
        match *self {
            Condition::Equals(v) => format!("== {}", v),
            Condition::NotEquals(v) => format!("!= {}", v),
            Condition::Above(v) => format!("> {}", v),
            Condition::Below(v) => format!("< {}", v),
            Condition::InRange(lo, hi) => format!("in [{}, {}]", lo, hi),
        }
    }
}

/// Crossing direction for threshold searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Rising,
    Falling,
    Either,
}

/// Indices where `cond` starts to hold. Index 0 counts if the condition holds there.
pub fn rising_edges(values: &[f64], cond: Condition) -> Vec<usize> {
    let mut edges = Vec::new();
    let mut previous = false;
    for (i, &v) in values.iter().enumerate() {
        let current = cond.holds(v);
        if current && !previous {
            edges.push(i);
        }
        previous = current;
    }
    edges
}

/// Indices where `cond` stops holding (first sample where it no longer holds)
pub fn falling_edges(values: &[f64], cond: Condition) -> Vec<usize> {
    let mut edges = Vec::new();
    for i in 1..values.len() {
        if cond.holds(values[i - 1]) && !cond.holds(values[i]) {
            edges.push(i);
        }
    }
    edges
}

/// First index at or after `start` where `cond` holds
pub fn first_index_from(values: &[f64], start: usize, cond: Condition) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, &v)| cond.holds(v))
        .map(|(i, _)| i)
}

/// Indices `i` where the signal crosses `threshold` between samples `i-1` and `i`.
///
/// A rising crossing goes from `< threshold` to `>= threshold`; a falling
/// crossing from `>= threshold` to `< threshold`.
pub fn threshold_crossings(values: &[f64], threshold: f64, direction: Direction) -> Vec<usize> {
    let mut crossings = Vec::new();
    for i in 1..values.len() {
        let (prev, curr) = (values[i - 1], values[i]);
        if prev.is_nan() || curr.is_nan() {
            continue;
        }
        let rising = prev < threshold && curr >= threshold;
        let falling = prev >= threshold && curr < threshold;
        let hit = match direction {
            Direction::Rising => rising,
            Direction::Falling => falling,
            Direction::Either => rising || falling,
        };
        if hit {
            crossings.push(i);
        }
    }
    crossings
}

/// Last index whose timestamp lies within `delay_s` of `timestamps[start]`.
///
/// Returns `None` when `start` is out of range. Timestamps must be sorted.
pub fn delay_window_end(timestamps: &[f64], start: usize, delay_s: f64) -> Option<usize> {
    let t0 = *timestamps.get(start)?;
    let limit = t0 + delay_s;
    // partition_point is at least start + 1 because timestamps[start] <= limit
    let end = timestamps.partition_point(|&t| t <= limit);
    Some(end.saturating_sub(1).max(start))
}

/// Indices where the value differs from the value `window` samples earlier
pub fn rolling_change(values: &[f64], window: usize) -> Vec<usize> {
    if window == 0 {
        return Vec::new();
    }
    (window..values.len())
        .filter(|&i| (values[i] - values[i - window]).abs() > EQ_TOLERANCE)
        .collect()
}

/// Contiguous index ranges `[start, end]` where `cond` holds
pub fn active_intervals(values: &[f64], cond: Condition) -> Vec<(usize, usize)> {
    let mut intervals = Vec::new();
    let mut open: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        match (cond.holds(v), open) {
            (true, None) => open = Some(i),
            (false, Some(start)) => {
                intervals.push((start, i - 1));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        intervals.push((start, values.len() - 1));
    }
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_condition_equality_tolerance() {
        assert!(Condition::Equals(3.0).holds(3.0000001));
        assert!(!Condition::Equals(3.0).holds(3.1));
        assert!(Condition::NotEquals(3.0).holds(4.0));
        assert!(!Condition::Above(1.0).holds(f64::NAN));
        assert!(Condition::InRange(0.0, 1.0).holds(1.0));
    }

    #[test]
    fn test_rising_and_falling_edges() {
        let core_state = [1.0, 3.0, 3.0, 1.0, 3.0];
        assert_eq!(rising_edges(&core_state, Condition::Equals(3.0)), vec![1, 4]);
        assert_eq!(falling_edges(&core_state, Condition::Equals(3.0)), vec![3]);
        // condition already true at the first sample counts as an edge
        assert_eq!(rising_edges(&[3.0, 3.0], Condition::Equals(3.0)), vec![0]);
    }

    #[test]
    fn test_first_index_from() {
        let values = [0.0, 5.0, 0.0, 5.0];
        assert_eq!(first_index_from(&values, 0, Condition::Above(1.0)), Some(1));
        assert_eq!(first_index_from(&values, 2, Condition::Above(1.0)), Some(3));
        assert_eq!(first_index_from(&values, 4, Condition::Above(1.0)), None);
    }

    #[test]
    fn test_threshold_crossings() {
        let speed = [0.0, 1.0, 2.5, 2.0, 1.0, 3.0];
        assert_eq!(threshold_crossings(&speed, 2.0, Direction::Rising), vec![2, 5]);
        assert_eq!(threshold_crossings(&speed, 2.0, Direction::Falling), vec![4]);
        assert_eq!(threshold_crossings(&speed, 2.0, Direction::Either), vec![2, 4, 5]);
    }

    #[test]
    fn test_delay_window_end() {
        let ts = [0.0, 0.02, 0.04, 0.06, 0.08, 0.10, 0.12, 0.14];
        assert_eq!(delay_window_end(&ts, 0, 0.1), Some(5));
        assert_eq!(delay_window_end(&ts, 6, 0.1), Some(7));
        assert_eq!(delay_window_end(&ts, 3, 0.0), Some(3));
        assert_eq!(delay_window_end(&ts, 8, 0.1), None);
    }

    #[test]
    fn test_rolling_change() {
        let gear = [0.0, 0.0, 1.0, 1.0, 1.0, 2.0];
        assert_eq!(rolling_change(&gear, 1), vec![2, 5]);
        assert_eq!(rolling_change(&gear, 2), vec![2, 3, 5]);
        assert!(rolling_change(&gear, 0).is_empty());
    }

    #[test]
    fn test_active_intervals() {
        let active = [0.0, 1.0, 1.0, 0.0, 1.0];
        assert_eq!(
            active_intervals(&active, Condition::Equals(1.0)),
            vec![(1, 2), (4, 4)]
        );
    }

    proptest! {
        #[test]
        fn prop_rising_edges_alternate_with_falling(values in proptest::collection::vec(0u8..3, 0..64)) {
            let values: Vec<f64> = values.into_iter().map(f64::from).collect();
            let cond = Condition::Equals(1.0);
            let rising = rising_edges(&values, cond);
            let falling = falling_edges(&values, cond);
            // every falling edge is preceded by a rising edge
            prop_assert!(rising.len() == falling.len() || rising.len() == falling.len() + 1);
            for (r, f) in rising.iter().zip(falling.iter()) {
                prop_assert!(r < f);
            }
        }
    }
}
