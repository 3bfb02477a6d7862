//! Logical-to-physical signal name mapping
//!
//! The same logical signal is logged under different paths depending on the
//! logging configuration (CAN, simulation, recorder exports). A `SignalMap`
//! lists the candidates in priority order and resolves once per trace.
//!
//! Logical names are case-insensitive: configuration layers may lowercase
//! table keys while step settings keep their original spelling.

use crate::error::TraceError;
use crate::trace::SignalTrace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Logical name -> ordered candidate physical paths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct SignalMap {
    entries: BTreeMap<String, Vec<String>>,
}

fn logical_key(logical: &str) -> String {
    logical.to_lowercase()
}

impl From<BTreeMap<String, Vec<String>>> for SignalMap {
    fn from(table: BTreeMap<String, Vec<String>>) -> Self {
        let mut map = Self::new();
        for (logical, candidates) in table {
            map.insert(logical, candidates);
        }
        map
    }
}

impl From<SignalMap> for BTreeMap<String, Vec<String>> {
    fn from(map: SignalMap) -> Self {
        map.entries
    }
}

impl SignalMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a logical signal with its candidate paths (builder style)
    pub fn with<I, S>(mut self, logical: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(logical, candidates);
        self
    }

    /// Add or replace a logical signal
    pub fn insert<I, S>(&mut self, logical: impl Into<String>, candidates: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let logical: String = logical.into();
        self.entries.insert(
            logical_key(&logical),
            candidates.into_iter().map(Into::into).collect(),
        );
    }

    /// Candidate paths of a logical signal
    pub fn candidates(&self, logical: &str) -> Option<&[String]> {
        self.entries.get(&logical_key(logical)).map(Vec::as_slice)
    }

    /// Number of logical signals
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every logical signal to the first candidate present in the trace.
    ///
    /// Logical signals without any present candidate are left out.
    pub fn resolve(&self, trace: &SignalTrace) -> ResolvedSignals {
        let mut resolved = BTreeMap::new();
        for (logical, candidates) in &self.entries {
            match candidates.iter().find(|path| trace.contains(path)) {
                Some(path) => {
                    debug!("Resolved {} -> {}", logical, path);
                    resolved.insert(logical.clone(), path.clone());
                }
                None => debug!("No candidate path present for {}", logical),
            }
        }
        ResolvedSignals { resolved }
    }

    /// Resolve and fail on the first logical signal in `required` that cannot be found.
    ///
    /// A required name absent from the map is treated as its own single
    /// candidate, so plain physical names can be used without a mapping entry.
    pub fn resolve_required(
        &self,
        trace: &SignalTrace,
        required: &[&str],
    ) -> Result<ResolvedSignals, TraceError> {
        let mut resolved = self.resolve(trace);
        for &logical in required {
            if resolved.physical(logical).is_some() {
                continue;
            }
            match self.candidates(logical) {
                Some(candidates) => {
                    warn!("No candidate path present for required signal {}", logical);
                    return Err(TraceError::UnresolvedSignal {
                        logical: logical.to_string(),
                        candidates: candidates.to_vec(),
                    })
                }
                None if trace.contains(logical) => {
                    resolved
                        .resolved
                        .insert(logical_key(logical), logical.to_string());
                }
                None => {
                    warn!("Required signal {} is neither mapped nor in the trace", logical);
                    return Err(TraceError::UnresolvedSignal {
                        logical: logical.to_string(),
                        candidates: vec![logical.to_string()],
                    })
                }
            }
        }
        Ok(resolved)
    }
}

/// Result of resolving a `SignalMap` against one trace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSignals {
    resolved: BTreeMap<String, String>,
}

impl ResolvedSignals {
    /// Physical path chosen for a logical signal
    pub fn physical(&self, logical: &str) -> Option<&str> {
        self.resolved.get(&logical_key(logical)).map(String::as_str)
    }

    /// Column of a logical signal
    pub fn column<'a>(&self, trace: &'a SignalTrace, logical: &str) -> Result<&'a [f64], TraceError> {
        let physical = self
            .physical(logical)
            .ok_or_else(|| TraceError::MissingSignal(logical.to_string()))?;
        trace.signal(physical)
    }

    /// Iterate over (logical, physical) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.resolved.iter().map(|(l, p)| (l.as_str(), p.as_str()))
    }
}
