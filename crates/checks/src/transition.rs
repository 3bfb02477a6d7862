//! State transition within a delay
//!
//! Every time the trigger condition starts to hold, the response condition
//! must hold at some sample no later than `max_delay_s` after the trigger.

use crate::physical_name;
use crate::recording::Recording;
use serde::{Deserialize, Serialize};
use signal_trace::processing::{delay_window_end, first_index_from, rising_edges};
use signal_trace::{Condition, SignalMap};
use tracing::debug;
use verdict::{escape_html, ChartSpec, EvaluationError, StepInfo, StepResult, TestStep};

/// Transition step configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    #[serde(flatten)]
    pub info: StepInfo,

    /// Logical trigger signal
    pub trigger_signal: String,

    /// Condition whose onset triggers the check
    pub trigger: Condition,

    /// Logical response signal
    pub response_signal: String,

    /// Expected response
    pub response: Condition,

    /// Allowed reaction time (s)
    pub max_delay_s: f64,
}

/// Outcome for one trigger edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reaction {
    /// Trigger sample index
    pub trigger_index: usize,

    /// First sample index where the response holds, if any
    pub response_index: Option<usize>,

    /// Reaction time (s) when a response was found
    pub delay_s: Option<f64>,

    /// Response found within the allowed delay
    pub in_time: bool,
}

/// Find the reaction to every trigger edge
pub fn reactions(
    timestamps: &[f64],
    trigger: &[f64],
    response: &[f64],
    config: &TransitionConfig,
) -> Result<Vec<Reaction>, EvaluationError> {
    if !(config.max_delay_s.is_finite() && config.max_delay_s >= 0.0) {
        return Err(EvaluationError::Invalid(format!(
            "max_delay_s must be a non-negative number, got {}",
            config.max_delay_s
        )));
    }

    rising_edges(trigger, config.trigger)
        .into_iter()
        .map(|start| {
            let window_end = delay_window_end(timestamps, start, config.max_delay_s).ok_or_else(|| {
                EvaluationError::Invalid(format!("trigger index {} outside the trace", start))
            })?;
            let response_index = first_index_from(response, start, config.response);
            Ok(Reaction {
                trigger_index: start,
                response_index,
                delay_s: response_index.map(|i| timestamps[i] - timestamps[start]),
                in_time: response_index.is_some_and(|i| i <= window_end),
            })
        })
        .collect()
}

/// Test step: response follows the trigger within the allowed delay
pub struct TransitionStep {
    config: TransitionConfig,
    signals: SignalMap,
}

impl TransitionStep {
    pub fn new(config: TransitionConfig, signals: SignalMap) -> Self {
        Self { config, signals }
    }
}

impl TestStep<Recording> for TransitionStep {
    fn info(&self) -> &StepInfo {
        &self.config.info
    }

    fn evaluate(&self, recording: &Recording) -> Result<StepResult, EvaluationError> {
        let cfg = &self.config;
        let trace = recording.trace()?;
        let resolved = self.signals.resolve_required(
            trace,
            &[cfg.trigger_signal.as_str(), cfg.response_signal.as_str()],
        )?;
        let trigger = resolved.column(trace, &cfg.trigger_signal)?;
        let response = resolved.column(trace, &cfg.response_signal)?;
        let timestamps = trace.timestamps();

        let mut chart = ChartSpec::new(format!("{} / {}", cfg.trigger_signal, cfg.response_signal))
            .with_trace(physical_name(&resolved, &cfg.trigger_signal)?, timestamps, trigger)
            .with_trace(physical_name(&resolved, &cfg.response_signal)?, timestamps, response);

        let reactions = reactions(timestamps, trigger, response, cfg)?;
        debug!("{}: {} trigger edges", recording.name, reactions.len());

        let trigger_text = format!(
            "<b>{}</b> {}",
            escape_html(&cfg.trigger_signal),
            escape_html(&cfg.trigger.describe())
        );
        let response_text = format!(
            "<b>{}</b> {}",
            escape_html(&cfg.response_signal),
            escape_html(&cfg.response.describe())
        );

        if reactions.is_empty() {
            return Ok(StepResult::not_assessed(format!(
                "Trigger {} never observed; transition not assessed.",
                trigger_text
            ))
            .with_chart(chart));
        }

        let late: Vec<&Reaction> = reactions.iter().filter(|r| !r.in_time).collect();
        for r in &late {
            let t = timestamps[r.trigger_index];
            let label = match r.delay_s {
                Some(d) => format!("response after {:.3}s", d),
                None => "no response".to_string(),
            };
            chart.add_marker(t, trigger[r.trigger_index], label);
        }

        if late.is_empty() {
            let worst = reactions
                .iter()
                .filter_map(|r| r.delay_s)
                .fold(0.0_f64, f64::max);
            return Ok(StepResult::pass(format!(
                "{} followed all {} occurrences of {} within {}s (slowest {:.3}s).",
                response_text,
                reactions.len(),
                trigger_text,
                cfg.max_delay_s,
                worst
            ))
            .with_chart(chart));
        }

        let mut text = format!(
            "{} did not follow {} within {}s in {} of {} occurrences:<ul>",
            response_text,
            trigger_text,
            cfg.max_delay_s,
            late.len(),
            reactions.len()
        );
        for r in &late {
            let t = timestamps[r.trigger_index];
            match r.delay_s {
                Some(d) => text.push_str(&format!("<li>t={:.3}s: response after {:.3}s</li>", t, d)),
                None => text.push_str(&format!("<li>t={:.3}s: no response until end of trace</li>", t)),
            }
        }
        text.push_str("</ul>");
        Ok(StepResult::fail(text).with_chart(chart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_trace::SignalTrace;
    use verdict::{run_safely, Verdict};

    const CORE_PARKING: f64 = 3.0;
    const CORE_ERROR: f64 = 5.0;

    fn config(max_delay_s: f64) -> TransitionConfig {
        TransitionConfig {
            info: StepInfo::new("REQ-CORE-ERR", "TC_CORE_ERROR", "core enters ERROR on health fault"),
            trigger_signal: "health_fault".to_string(),
            trigger: Condition::Equals(1.0),
            response_signal: "core_state".to_string(),
            response: Condition::Equals(CORE_ERROR),
            max_delay_s,
        }
    }

    fn recording(fault: Vec<f64>, state: Vec<f64>) -> Recording {
        let timestamps = (0..fault.len()).map(|i| i as f64 * 0.02).collect();
        let trace = SignalTrace::new(timestamps)
            .unwrap()
            .with_signal("Bus.Health.fault", fault)
            .unwrap()
            .with_signal("Bus.Core.state", state)
            .unwrap();
        Recording::new("rec").with_trace(trace)
    }

    fn signals() -> SignalMap {
        SignalMap::new()
            .with("health_fault", ["Missing.Path", "Bus.Health.fault"])
            .with("core_state", ["Bus.Core.state"])
    }

    fn step(max_delay_s: f64) -> TransitionStep {
        TransitionStep::new(config(max_delay_s), signals())
    }

    #[test]
    fn test_response_in_time_passes() {
        let fault = vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let state = vec![CORE_PARKING, CORE_PARKING, CORE_PARKING, CORE_PARKING, CORE_ERROR, CORE_ERROR, CORE_ERROR];
        let result = run_safely(&step(0.1), &recording(fault, state));
        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.charts[0].traces.len(), 2);
        assert_eq!(result.charts[0].traces[0].name, "Bus.Health.fault");
    }

    #[test]
    fn test_late_response_fails() {
        let fault = vec![0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let state = vec![CORE_PARKING, CORE_PARKING, CORE_PARKING, CORE_PARKING, CORE_PARKING, CORE_PARKING, CORE_PARKING, CORE_ERROR];
        let result = run_safely(&step(0.05), &recording(fault, state));
        assert_eq!(result.verdict, Verdict::Fail);
        assert_eq!(result.charts[0].markers.len(), 1);
        assert!(result.evaluation.contains("response after 0.120s"));
    }

    #[test]
    fn test_missing_response_fails() {
        let fault = vec![0.0, 1.0, 1.0, 0.0];
        let state = vec![CORE_PARKING; 4];
        let result = run_safely(&step(0.1), &recording(fault, state));
        assert_eq!(result.verdict, Verdict::Fail);
        assert!(result.evaluation.contains("no response"));
    }

    #[test]
    fn test_no_trigger_not_assessed() {
        let result = run_safely(&step(0.1), &recording(vec![0.0; 5], vec![CORE_PARKING; 5]));
        assert_eq!(result.verdict, Verdict::NotAssessed);
    }

    #[test]
    fn test_each_edge_is_checked() {
        let timestamps = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let trigger = [1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let response = [0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let found = reactions(&timestamps, &trigger, &response, &config(0.15)).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].in_time);
        assert_eq!(found[0].response_index, Some(1));
        assert!(!found[1].in_time);
        assert_eq!(found[1].response_index, None);
    }

    #[test]
    fn test_unresolved_signal_is_input_missing() {
        let trace = SignalTrace::new(vec![0.0, 0.1])
            .unwrap()
            .with_signal("Bus.Core.state", vec![0.0, 0.0])
            .unwrap();
        let result = run_safely(&step(0.1), &Recording::new("rec").with_trace(trace));
        assert_eq!(result.verdict, Verdict::InputMissing);
    }

    #[test]
    fn test_negative_delay_is_data_nok() {
        let result = run_safely(&step(-1.0), &recording(vec![1.0, 1.0], vec![0.0, 0.0]));
        assert_eq!(result.verdict, Verdict::DataNok);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "requirement_id": "REQ-1", "test_case_id": "TC_1", "description": "d",
            "trigger_signal": "a", "trigger": { "op": "equals", "value": 1.0 },
            "response_signal": "b", "response": { "op": "in_range", "value": [4.0, 6.0] },
            "max_delay_s": 0.1
        }"#;
        let config: TransitionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.info.requirement_id, "REQ-1");
        assert_eq!(config.response, Condition::InRange(4.0, 6.0));
    }
}
