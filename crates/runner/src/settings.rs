//! Runner settings
//!
//! Loaded from an optional TOML file, then overridden by environment
//! variables prefixed with `TRACE_EVAL__` (e.g. `TRACE_EVAL__LOG_LEVEL=debug`).

use crate::RunnerError;
use association::AssociationConfig;
use checks::{DetectionRateConfig, IdCheckConfig, ThresholdConfig, TransitionConfig};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use signal_trace::SignalMap;
use std::path::Path;
use tracing::Level;
use verdict::StepInfo;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TRACE_EVAL";

/// Object-ID uniqueness step options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdUniquenessSettings {
    #[serde(flatten)]
    pub info: StepInfo,

    #[serde(flatten)]
    pub check: IdCheckConfig,
}

/// Complete runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Association gates for ground-truth matching
    pub association: AssociationConfig,

    /// Logical signal name -> candidate physical paths
    pub signals: SignalMap,

    /// State transition steps
    pub transitions: Vec<TransitionConfig>,

    /// Threshold steps
    pub thresholds: Vec<ThresholdConfig>,

    /// Object-ID uniqueness step, disabled when absent
    pub id_uniqueness: Option<IdUniquenessSettings>,

    /// Detection rate step, disabled when absent
    pub detection_rate: Option<DetectionRateConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            association: AssociationConfig::default(),
            signals: SignalMap::new(),
            transitions: Vec::new(),
            thresholds: Vec::new(),
            id_uniqueness: None,
            detection_rate: None,
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, RunnerError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string (no environment overrides)
    pub fn from_toml(text: &str) -> Result<Self, RunnerError> {
        let settings = Config::builder()
            .add_source(File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Parsed log level; an unknown name is an error rather than a silent default
    pub fn level(&self) -> Result<Level, RunnerError> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| RunnerError::LogLevel(self.log_level.clone()))
    }

    /// Number of configured steps
    pub fn step_count(&self) -> usize {
        self.transitions.len()
            + self.thresholds.len()
            + usize::from(self.id_uniqueness.is_some())
            + usize::from(self.detection_rate.is_some())
    }
}
