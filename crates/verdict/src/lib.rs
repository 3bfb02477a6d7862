//! Test Verdicts
//!
//! Result plumbing shared by every test step:
//! - Verdict categories and aggregation
//! - Step results with evaluation text, charts and metadata
//! - Isolated step execution (`run_safely`)

mod error;
mod result;
mod step;

pub use error::EvaluationError;
pub use result::{
    escape_html, ChartMarker, ChartSpec, ChartTrace, StepResult, DESCRIPTION, REQUIREMENT_ID,
    TEST_CASE_ID,
};
pub use step::{run_safely, StepInfo, TestStep};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical outcome of a test step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Observed behaviour matches the requirement
    Pass,
    /// Observed behaviour violates the requirement
    Fail,
    /// Trigger condition never observed, or ground truth unavailable
    NotAssessed,
    /// Required reader or signal absent
    InputMissing,
    /// Evaluation aborted on unexpected data
    DataNok,
}

impl Verdict {
    /// Rank used when aggregating; higher wins
    fn rank(self) -> u8 {
        match self {
            Verdict::Pass => 0,
            Verdict::NotAssessed => 1,
            Verdict::InputMissing => 2,
            Verdict::DataNok => 3,
            Verdict::Fail => 4,
        }
    }

    /// Worst verdict of several steps; NOT_ASSESSED when there are none
    pub fn combine<I: IntoIterator<Item = Verdict>>(verdicts: I) -> Verdict {
        verdicts
            .into_iter()
            .max_by_key(|v| v.rank())
            .unwrap_or(Verdict::NotAssessed)
    }

    /// Whether the verdict should fail a test run
    pub fn is_failure(self) -> bool {
        matches!(self, Verdict::Fail | Verdict::DataNok | Verdict::InputMissing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::NotAssessed => "NOT_ASSESSED",
            Verdict::InputMissing => "INPUT_MISSING",
            Verdict::DataNok => "DATA_NOK",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_worst_wins() {
        assert_eq!(Verdict::combine([]), Verdict::NotAssessed);
        assert_eq!(Verdict::combine([Verdict::Pass, Verdict::Pass]), Verdict::Pass);
        assert_eq!(
            Verdict::combine([Verdict::Pass, Verdict::NotAssessed]),
            Verdict::NotAssessed
        );
        assert_eq!(
            Verdict::combine([Verdict::DataNok, Verdict::Fail, Verdict::InputMissing]),
            Verdict::Fail
        );
    }

    #[test]
    fn test_failure_classification() {
        assert!(!Verdict::Pass.is_failure());
        assert!(!Verdict::NotAssessed.is_failure());
        assert!(Verdict::InputMissing.is_failure());
        assert_eq!(Verdict::DataNok.to_string(), "DATA_NOK");
    }
}
