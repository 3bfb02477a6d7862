//! Test steps and their isolated execution

use crate::error::EvaluationError;
use crate::result::{escape_html, StepResult, DESCRIPTION, REQUIREMENT_ID, TEST_CASE_ID};
use crate::Verdict;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use tracing::{error, info, warn};

/// Identification of a test step in the report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepInfo {
    pub requirement_id: String,
    pub test_case_id: String,
    pub description: String,
}

impl StepInfo {
    pub fn new(
        requirement_id: impl Into<String>,
        test_case_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            requirement_id: requirement_id.into(),
            test_case_id: test_case_id.into(),
            description: description.into(),
        }
    }

    /// Write the identification into the result's metadata table
    pub fn annotate(&self, result: &mut StepResult) {
        result
            .details
            .insert(REQUIREMENT_ID.to_string(), self.requirement_id.clone());
        result
            .details
            .insert(TEST_CASE_ID.to_string(), self.test_case_id.clone());
        result
            .details
            .insert(DESCRIPTION.to_string(), self.description.clone());
    }
}

/// One independent evaluation over a context `C` (usually a recording)
pub trait TestStep<C: ?Sized> {
    /// Identification for the report
    fn info(&self) -> &StepInfo;

    /// Evaluate the step
    fn evaluate(&self, ctx: &C) -> Result<StepResult, EvaluationError>;
}

/// Run a step so that nothing it does can escape the step.
///
/// Missing inputs become INPUT_MISSING, every other error or a panic becomes
/// DATA_NOK with the message in the evaluation text and an error chart.
pub fn run_safely<C: ?Sized, S: TestStep<C> + ?Sized>(step: &S, ctx: &C) -> StepResult {
    let info = step.info();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| step.evaluate(ctx)));

    let mut result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(err)) if err.is_missing_input() => {
            warn!("{}: input missing: {}", info.test_case_id, err);
            StepResult::new(
                Verdict::InputMissing,
                format!("Required input not available: <i>{}</i>", escape_html(&err.to_string())),
            )
        }
        Ok(Err(err)) => {
            error!("{}: evaluation failed: {}", info.test_case_id, err);
            StepResult::data_nok(&err.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("{}: evaluation panicked: {}", info.test_case_id, message);
            StepResult::data_nok(&message)
        }
    };

    info.annotate(&mut result);
    info!(
        "{} [{}]: {}",
        info.test_case_id, info.requirement_id, result.verdict
    );
    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
