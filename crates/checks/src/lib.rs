//! Test Steps
//!
//! Concrete evaluations over one recording:
//! - Object-ID uniqueness over overlapping outlines
//! - State transition within a delay
//! - Signal threshold while a function is active
//! - Ground-truth detection rate

pub mod detection_rate;
pub mod id_consistency;
mod recording;
pub mod threshold;
pub mod transition;

pub use detection_rate::{DetectionRateConfig, DetectionRateStep};
pub use id_consistency::{
    FrameOutcome, IdCheckConfig, IdConsistencyChecker, IdIssue, IdIssueReason, IdUniquenessStep,
};
pub use recording::Recording;
pub use threshold::{ThresholdConfig, ThresholdStep};
pub use transition::{TransitionConfig, TransitionStep};

use signal_trace::{ResolvedSignals, TraceError};
use verdict::EvaluationError;

/// Physical column name of a resolved logical signal
pub(crate) fn physical_name<'a>(
    resolved: &'a ResolvedSignals,
    logical: &str,
) -> Result<&'a str, EvaluationError> {
    resolved
        .physical(logical)
        .ok_or_else(|| TraceError::MissingSignal(logical.to_string()).into())
}
