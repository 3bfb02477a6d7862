//! Signal Traces
//!
//! In-memory representation of a recorded or simulated measurement:
//! - Timestamp-indexed signal columns with optional per-sample status
//! - Logical-to-physical signal name mapping
//! - Edge, threshold and delay-window helpers

mod error;
mod mapping;
pub mod processing;
mod trace;

pub use error::TraceError;
pub use mapping::{ResolvedSignals, SignalMap};
pub use processing::{Condition, Direction};
pub use trace::SignalTrace;

use serde::{Deserialize, Serialize};

/// Per-sample validity reported by the data-acquisition layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStatus {
    #[default]
    Ok,
    Invalid,
    NotAvailable,
    Init,
}

impl SignalStatus {
    /// Whether the sample can be used for evaluation
    pub fn is_ok(self) -> bool {
        self == SignalStatus::Ok
    }
}
