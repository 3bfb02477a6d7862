//! Step results handed to the reporting layer

use crate::Verdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Detail key for the requirement id
pub const REQUIREMENT_ID: &str = "requirement_id";
/// Detail key for the test case id
pub const TEST_CASE_ID: &str = "test_case_id";
/// Detail key for the step description
pub const DESCRIPTION: &str = "description";

/// Named x/y series of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTrace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Highlighted point on a chart (violation, trigger, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMarker {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

/// Chart description for an external plotting backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub traces: Vec<ChartTrace>,
    pub markers: Vec<ChartMarker>,
    /// Free text shown instead of (or next to) the data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ChartSpec {
    /// Empty chart with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Chart that only carries a message (used for errors)
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            title: "Evaluation error".to_string(),
            message: Some(text.into()),
            ..Default::default()
        }
    }

    /// Add a series (builder style)
    pub fn with_trace(mut self, name: impl Into<String>, x: &[f64], y: &[f64]) -> Self {
        self.traces.push(ChartTrace {
            name: name.into(),
            x: x.to_vec(),
            y: y.to_vec(),
        });
        self
    }

    /// Add a marker
    pub fn add_marker(&mut self, x: f64, y: f64, label: impl Into<String>) {
        self.markers.push(ChartMarker {
            x,
            y,
            label: label.into(),
        });
    }
}

/// Outcome of one test step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Verdict of the step
    pub verdict: Verdict,

    /// Human readable evaluation (HTML-flavoured)
    pub evaluation: String,

    /// Charts for the report
    pub charts: Vec<ChartSpec>,

    /// Metadata table (requirement id, test case id, description, ...)
    pub details: BTreeMap<String, String>,

    /// When the step was evaluated
    pub evaluated_at: DateTime<Utc>,
}

impl StepResult {
    /// Create a result with a verdict and evaluation text
    pub fn new(verdict: Verdict, evaluation: impl Into<String>) -> Self {
        Self {
            verdict,
            evaluation: evaluation.into(),
            charts: Vec::new(),
            details: BTreeMap::new(),
            evaluated_at: Utc::now(),
        }
    }

    pub fn pass(evaluation: impl Into<String>) -> Self {
        Self::new(Verdict::Pass, evaluation)
    }

    pub fn fail(evaluation: impl Into<String>) -> Self {
        Self::new(Verdict::Fail, evaluation)
    }

    pub fn not_assessed(evaluation: impl Into<String>) -> Self {
        Self::new(Verdict::NotAssessed, evaluation)
    }

    /// DATA_NOK result carrying the error text and an error chart
    pub fn data_nok(message: &str) -> Self {
        Self::new(
            Verdict::DataNok,
            format!("Evaluation aborted: <i>{}</i>", escape_html(message)),
        )
        .with_chart(ChartSpec::message(message))
    }

    /// Add a chart (builder style)
    pub fn with_chart(mut self, chart: ChartSpec) -> Self {
        self.charts.push(chart);
        self
    }

    /// Add a metadata entry (builder style)
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Escape text for inclusion in the evaluation string
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_nok_carries_message_chart() {
        let result = StepResult::data_nok("index <5> out of range");
        assert_eq!(result.verdict, Verdict::DataNok);
        assert!(result.evaluation.contains("&lt;5&gt;"));
        assert_eq!(result.charts.len(), 1);
        assert_eq!(
            result.charts[0].message.as_deref(),
            Some("index <5> out of range")
        );
    }

    #[test]
    fn test_serializes_verdict_names() {
        let result = StepResult::not_assessed("trigger never observed")
            .with_detail(REQUIREMENT_ID, "REQ-1234");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["verdict"], "NOT_ASSESSED");
        assert_eq!(json["details"]["requirement_id"], "REQ-1234");
    }
}
