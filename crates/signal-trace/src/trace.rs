//! Timestamp-indexed signal table

use crate::error::TraceError;
use crate::SignalStatus;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// On-disk layout of a trace before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawTrace {
    timestamps: Vec<f64>,
    #[serde(default)]
    signals: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    status: BTreeMap<String, Vec<SignalStatus>>,
}

/// A recorded measurement: one row per timestamp, one column per signal.
///
/// Timestamps are in seconds and strictly increasing. Every signal column and
/// every status column has exactly one entry per timestamp. Enum-typed signals
/// (core state, driving mode request, door status, ...) are carried as `f64`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTrace", into = "RawTrace")]
pub struct SignalTrace {
    timestamps: Vec<f64>,
    signals: BTreeMap<String, Vec<f64>>,
    status: BTreeMap<String, Vec<SignalStatus>>,
}

impl SignalTrace {
    /// Create an empty trace over the given timestamps
    pub fn new(timestamps: Vec<f64>) -> Result<Self, TraceError> {
        for (index, pair) in timestamps.windows(2).enumerate() {
            if pair[1].partial_cmp(&pair[0]) != Some(Ordering::Greater) {
                return Err(TraceError::NonMonotonic {
                    index: index + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        Ok(Self {
            timestamps,
            signals: BTreeMap::new(),
            status: BTreeMap::new(),
        })
    }

    /// Add a signal column (builder style)
    pub fn with_signal(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, TraceError> {
        self.insert_signal(name, values)?;
        Ok(self)
    }

    /// Add a status column for an existing or future signal (builder style)
    pub fn with_status(
        mut self,
        name: impl Into<String>,
        status: Vec<SignalStatus>,
    ) -> Result<Self, TraceError> {
        let name = name.into();
        self.check_len(&name, status.len())?;
        self.status.insert(name, status);
        Ok(self)
    }

    /// Insert or replace a signal column
    pub fn insert_signal(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), TraceError> {
        let name = name.into();
        self.check_len(&name, values.len())?;
        self.signals.insert(name, values);
        Ok(())
    }

    fn check_len(&self, name: &str, actual: usize) -> Result<(), TraceError> {
        if actual != self.timestamps.len() {
            return Err(TraceError::LengthMismatch {
                name: name.to_string(),
                expected: self.timestamps.len(),
                actual,
            });
        }
        Ok(())
    }

    /// Load a trace from JSON
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, TraceError> {
        let trace: SignalTrace = serde_json::from_reader(reader)?;
        debug!(
            "Loaded trace with {} samples and {} signals",
            trace.len(),
            trace.signals.len()
        );
        Ok(trace)
    }

    /// Load a trace from a JSON file
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        info!("Loading signal trace from {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    /// Sample timestamps (seconds)
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if trace has no samples
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Whether a signal column exists
    pub fn contains(&self, name: &str) -> bool {
        self.signals.contains_key(name)
    }

    /// Signal column if present
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.signals.get(name).map(Vec::as_slice)
    }

    /// Signal column, or `MissingSignal`
    pub fn signal(&self, name: &str) -> Result<&[f64], TraceError> {
        self.get(name)
            .ok_or_else(|| TraceError::MissingSignal(name.to_string()))
    }

    /// Names of all signal columns
    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    /// Status of a single sample; `None` when the signal carries no status column
    pub fn status_at(&self, name: &str, index: usize) -> Result<Option<SignalStatus>, TraceError> {
        if index >= self.len() {
            return Err(TraceError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(self.status.get(name).map(|column| column[index]))
    }

    /// A sample is valid when the signal has no status column or its status is OK
    pub fn sample_valid(&self, name: &str, index: usize) -> bool {
        match self.status.get(name) {
            Some(column) => column.get(index).is_some_and(|s| s.is_ok()),
            None => index < self.len(),
        }
    }

    /// Index of the last sample at or before `t`
    pub fn index_at_or_before(&self, t: f64) -> Option<usize> {
        let pos = self.timestamps.partition_point(|&ts| ts <= t);
        pos.checked_sub(1)
    }
}

impl TryFrom<RawTrace> for SignalTrace {
    type Error = TraceError;

    fn try_from(raw: RawTrace) -> Result<Self, Self::Error> {
        let mut trace = SignalTrace::new(raw.timestamps)?;
        for (name, values) in raw.signals {
            trace.insert_signal(name, values)?;
        }
        for (name, status) in raw.status {
            trace.check_len(&name, status.len())?;
            trace.status.insert(name, status);
        }
        Ok(trace)
    }
}

impl From<SignalTrace> for RawTrace {
    fn from(trace: SignalTrace) -> Self {
        RawTrace {
            timestamps: trace.timestamps,
            signals: trace.signals,
            status: trace.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trace() -> SignalTrace {
        SignalTrace::new(vec![0.0, 0.1, 0.2, 0.3])
            .unwrap()
            .with_signal("core_state", vec![1.0, 1.0, 3.0, 3.0])
            .unwrap()
    }

    #[test]
    fn test_missing_signal() {
        let trace = sample_trace();
        assert!(trace.signal("core_state").is_ok());
        let err = trace.signal("door_status").unwrap_err();
        assert!(matches!(err, TraceError::MissingSignal(ref name) if name == "door_status"));
        assert!(err.is_missing_input());
    }

    #[test]
    fn test_rejects_non_monotonic_timestamps() {
        let err = SignalTrace::new(vec![0.0, 0.2, 0.2]).unwrap_err();
        assert!(matches!(err, TraceError::NonMonotonic { index: 2, .. }));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = sample_trace()
            .with_signal("speed", vec![1.0, 2.0])
            .unwrap_err();
        assert!(matches!(
            err,
            TraceError::LengthMismatch { expected: 4, actual: 2, .. }
        ));
    }

    #[test]
    fn test_sample_validity() {
        let trace = sample_trace()
            .with_status(
                "core_state",
                vec![
                    SignalStatus::Init,
                    SignalStatus::Ok,
                    SignalStatus::Invalid,
                    SignalStatus::Ok,
                ],
            )
            .unwrap()
            .with_signal("speed", vec![0.0; 4])
            .unwrap();

        assert!(!trace.sample_valid("core_state", 0));
        assert!(trace.sample_valid("core_state", 1));
        assert!(!trace.sample_valid("core_state", 2));
        // no status column means every in-range sample is valid
        assert!(trace.sample_valid("speed", 3));
        assert!(!trace.sample_valid("speed", 4));
    }

    #[test]
    fn test_json_load() {
        let json = r#"{
            "timestamps": [0.0, 0.5, 1.0],
            "signals": { "gear": [0, 1, 1] },
            "status": { "gear": ["OK", "OK", "INVALID"] }
        }"#;
        let trace = SignalTrace::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.signal("gear").unwrap(), &[0.0, 1.0, 1.0]);
        assert_eq!(trace.status_at("gear", 2).unwrap(), Some(SignalStatus::Invalid));
    }

    #[test]
    fn test_json_load_validates() {
        let json = r#"{ "timestamps": [0.0, 0.5], "signals": { "gear": [0] } }"#;
        assert!(SignalTrace::from_json_reader(json.as_bytes()).is_err());
    }

    #[test]
    fn test_index_at_or_before() {
        let trace = sample_trace();
        assert_eq!(trace.index_at_or_before(-1.0), None);
        assert_eq!(trace.index_at_or_before(0.0), Some(0));
        assert_eq!(trace.index_at_or_before(0.15), Some(1));
        assert_eq!(trace.index_at_or_before(10.0), Some(3));
    }
}
