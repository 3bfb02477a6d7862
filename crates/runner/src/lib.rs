//! Trace Evaluation Runner
//!
//! Loads a recording, runs the configured test steps in isolation and
//! collects their results into one report.

mod settings;

pub use settings::{IdUniquenessSettings, Settings, ENV_PREFIX};

use checks::{DetectionRateStep, IdUniquenessStep, Recording, ThresholdStep, TransitionStep};
use chrono::{DateTime, Utc};
use ground_truth::{DetectionFrames, GroundTruthSet, PolygonFrames};
use serde::Serialize;
use signal_trace::SignalTrace;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;
use verdict::{run_safely, StepResult, TestStep, Verdict};

/// Runner error types
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid log level: {0}")]
    LogLevel(String),
}

/// Initialize logging
pub fn init_logging(settings: &Settings) -> Result<(), RunnerError> {
    let level = settings.level()?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if settings.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Input files of one recording; every input is optional
#[derive(Debug, Clone, Default)]
pub struct InputPaths {
    pub trace: Option<PathBuf>,
    pub polygons: Option<PathBuf>,
    pub ground_truth: Option<PathBuf>,
    pub detections: Option<PathBuf>,
}

/// Load whatever inputs are given.
///
/// An input that fails to load is logged and left out, so the steps that
/// need it report INPUT_MISSING while the others still run.
pub fn load_recording(name: impl Into<String>, paths: &InputPaths) -> Recording {
    let mut recording = Recording::new(name);
    recording.trace = load_optional(paths.trace.as_deref(), "trace", |p| {
        SignalTrace::from_json_path(p)
    });
    recording.polygons = load_optional(paths.polygons.as_deref(), "polygon frames", |p| {
        PolygonFrames::from_json_path(p)
    });
    recording.ground_truth = load_optional(paths.ground_truth.as_deref(), "ground truth", |p| {
        GroundTruthSet::from_json_path(p)
    });
    recording.detections = load_optional(paths.detections.as_deref(), "detection frames", |p| {
        DetectionFrames::from_json_path(p)
    });
    recording
}

fn load_optional<T, E: std::fmt::Display>(
    path: Option<&Path>,
    what: &str,
    load: impl FnOnce(&Path) -> Result<T, E>,
) -> Option<T> {
    let path = path?;
    match load(path) {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Failed to load {} from {}: {}", what, path.display(), e);
            None
        }
    }
}

/// Build the configured steps in report order
pub fn build_steps(settings: &Settings) -> Vec<Box<dyn TestStep<Recording>>> {
    let mut steps: Vec<Box<dyn TestStep<Recording>>> = Vec::with_capacity(settings.step_count());

    if let Some(id) = &settings.id_uniqueness {
        steps.push(Box::new(IdUniquenessStep::new(id.info.clone(), id.check.clone())));
    }
    for transition in &settings.transitions {
        steps.push(Box::new(TransitionStep::new(transition.clone(), settings.signals.clone())));
    }
    for threshold in &settings.thresholds {
        steps.push(Box::new(ThresholdStep::new(threshold.clone(), settings.signals.clone())));
    }
    if let Some(rate) = &settings.detection_rate {
        steps.push(Box::new(DetectionRateStep::new(rate.clone(), settings.association.clone())));
    }
    steps
}

/// Run every configured step; one step failing never stops the others
pub fn run_all(settings: &Settings, recording: &Recording) -> Vec<StepResult> {
    let steps = build_steps(settings);
    info!("Running {} steps on {}", steps.len(), recording.name);
    steps
        .iter()
        .map(|step| run_safely(step.as_ref(), recording))
        .collect()
}

/// Results of one run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub recording: String,
    pub verdict: Verdict,
    pub generated_at: DateTime<Utc>,
    pub steps: Vec<StepResult>,
}

impl Report {
    /// Wrap step results; the overall verdict is the worst step verdict
    pub fn new(recording: impl Into<String>, steps: Vec<StepResult>) -> Self {
        Self {
            recording: recording.into(),
            verdict: Verdict::combine(steps.iter().map(|s| s.verdict)),
            generated_at: Utc::now(),
            steps,
        }
    }

    /// Write as pretty JSON
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), RunnerError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Write to a file, or stdout when no path is given
    pub fn write_to(&self, path: Option<&Path>) -> Result<(), RunnerError> {
        match path {
            Some(path) => {
                let file = std::fs::File::create(path)?;
                let mut writer = std::io::BufWriter::new(file);
                self.write_json(&mut writer)?;
                writer.flush()?;
                info!("Report written to {}", path.display());
            }
            None => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                self.write_json(&mut lock)?;
                writeln!(lock)?;
            }
        }
        Ok(())
    }
}
