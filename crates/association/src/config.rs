//! Association configuration

use serde::{Deserialize, Serialize};

/// Scoring strategy used by the greedy matcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Footprint overlap ratio, highest combined ratio wins
    #[default]
    Overlap,
    /// Squared centre distance, lowest wins
    Nearest,
}

impl Strategy {
    /// Whether `candidate` strictly beats `best` under this strategy
    pub fn is_better(self, candidate: f64, best: f64) -> bool {
        match self {
            Strategy::Overlap => candidate > best,
            Strategy::Nearest => candidate < best,
        }
    }
}

/// Association configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationConfig {
    /// Both `intersection / own area` ratios must exceed this
    pub min_overlap_ratio: f64,

    /// Squared centre distance must stay below this (m²)
    pub max_distance_squared: f64,

    /// Scoring strategy
    pub strategy: Strategy,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            min_overlap_ratio: 0.7,
            max_distance_squared: 2.0,
            strategy: Strategy::Overlap,
        }
    }
}

impl AssociationConfig {
    /// Builder-style setter for the overlap ratio gate
    pub fn with_min_overlap_ratio(mut self, ratio: f64) -> Self {
        self.min_overlap_ratio = ratio;
        self
    }

    /// Builder-style setter for the distance gate
    pub fn with_max_distance_squared(mut self, distance_squared: f64) -> Self {
        self.max_distance_squared = distance_squared;
        self
    }

    /// Builder-style setter for the strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}
