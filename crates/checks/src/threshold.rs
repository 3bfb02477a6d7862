//! Signal threshold while a function is active

use crate::physical_name;
use crate::recording::Recording;
use serde::{Deserialize, Serialize};
use signal_trace::processing::active_intervals;
use signal_trace::{Condition, SignalMap, SignalTrace};
use tracing::debug;
use verdict::{escape_html, ChartSpec, EvaluationError, StepInfo, StepResult, TestStep};

/// Violation intervals listed in the evaluation text
const MAX_LISTED_VIOLATIONS: usize = 20;

/// Threshold step configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(flatten)]
    pub info: StepInfo,

    /// Logical signal telling whether the function is active
    pub activation_signal: String,

    /// Condition on the activation signal
    pub activation: Condition,

    /// Logical signal under test
    pub monitored_signal: String,

    /// Condition the monitored signal must satisfy while active
    pub expected: Condition,
}

/// Violations of the expected condition while active
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdOutcome {
    /// Number of active samples with valid status
    pub checked: usize,

    /// Violating index ranges `[start, end]`
    pub violations: Vec<(usize, usize)>,
}

/// Check `monitored` against `expected` on every active, valid sample
pub fn check_while_active(
    trace: &SignalTrace,
    activation: (&str, Condition),
    monitored: (&str, Condition),
) -> Result<ThresholdOutcome, EvaluationError> {
    let (act_name, act_cond) = activation;
    let (mon_name, expected) = monitored;
    let act = trace.signal(act_name)?;
    let mon = trace.signal(mon_name)?;

    let mut outcome = ThresholdOutcome::default();
    let mut open: Option<(usize, usize)> = None;

    for (start, end) in active_intervals(act, act_cond) {
        for i in start..=end {
            if !trace.sample_valid(act_name, i) || !trace.sample_valid(mon_name, i) {
                continue;
            }
            outcome.checked += 1;
            if expected.holds(mon[i]) {
                if let Some(range) = open.take() {
                    outcome.violations.push(range);
                }
                continue;
            }
            open = match open {
                Some((s, e)) if e + 1 == i => Some((s, i)),
                Some(range) => {
                    outcome.violations.push(range);
                    Some((i, i))
                }
                None => Some((i, i)),
            };
        }
    }
    if let Some(range) = open {
        outcome.violations.push(range);
    }
    Ok(outcome)
}

/// Test step: monitored signal stays within its expected range while active
pub struct ThresholdStep {
    config: ThresholdConfig,
    signals: SignalMap,
}

impl ThresholdStep {
    pub fn new(config: ThresholdConfig, signals: SignalMap) -> Self {
        Self { config, signals }
    }
}

impl TestStep<Recording> for ThresholdStep {
    fn info(&self) -> &StepInfo {
        &self.config.info
    }

    fn evaluate(&self, recording: &Recording) -> Result<StepResult, EvaluationError> {
        let cfg = &self.config;
        let trace = recording.trace()?;
        let resolved = self.signals.resolve_required(
            trace,
            &[cfg.activation_signal.as_str(), cfg.monitored_signal.as_str()],
        )?;
        let act_name = physical_name(&resolved, &cfg.activation_signal)?;
        let mon_name = physical_name(&resolved, &cfg.monitored_signal)?;
        let timestamps = trace.timestamps();
        let monitored = trace.signal(mon_name)?;

        let outcome = check_while_active(trace, (act_name, cfg.activation), (mon_name, cfg.expected))?;
        debug!(
            "{}: {} active samples checked, {} violation intervals",
            recording.name,
            outcome.checked,
            outcome.violations.len()
        );

        let mut chart = ChartSpec::new(format!("{} while {} active", cfg.monitored_signal, cfg.activation_signal))
            .with_trace(act_name, timestamps, trace.signal(act_name)?)
            .with_trace(mon_name, timestamps, monitored);

        let expected_text = format!(
            "<b>{}</b> {}",
            escape_html(&cfg.monitored_signal),
            escape_html(&cfg.expected.describe())
        );
        let activation_text = format!(
            "<b>{}</b> {}",
            escape_html(&cfg.activation_signal),
            escape_html(&cfg.activation.describe())
        );

        if outcome.checked == 0 {
            return Ok(StepResult::not_assessed(format!(
                "Activation {} never observed with valid signals; threshold not assessed.",
                activation_text
            ))
            .with_chart(chart));
        }

        if outcome.violations.is_empty() {
            return Ok(StepResult::pass(format!(
                "{} held on all {} samples while {}.",
                expected_text, outcome.checked, activation_text
            ))
            .with_chart(chart));
        }

        for &(start, _) in &outcome.violations {
            chart.add_marker(timestamps[start], monitored[start], "violation");
        }

        let mut text = format!(
            "{} violated while {} in {} intervals:<ul>",
            expected_text,
            activation_text,
            outcome.violations.len()
        );
        for &(start, end) in outcome.violations.iter().take(MAX_LISTED_VIOLATIONS) {
            text.push_str(&format!(
                "<li>t={:.3}s to {:.3}s (value {} at start)</li>",
                timestamps[start], timestamps[end], monitored[start]
            ));
        }
        if outcome.violations.len() > MAX_LISTED_VIOLATIONS {
            text.push_str(&format!(
                "<li>... {} more</li>",
                outcome.violations.len() - MAX_LISTED_VIOLATIONS
            ));
        }
        text.push_str("</ul>");
        Ok(StepResult::fail(text).with_chart(chart))
    }
}
