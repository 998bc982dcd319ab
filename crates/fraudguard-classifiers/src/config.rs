//! Configuration for classifier selection and model loading

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which classifier implementation to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Pre-trained tree ensemble read from `path`
    #[default]
    Forest,
    /// Deterministic rule-count scorer
    Heuristic,
}

/// Classifier configuration (the `classifier` section of the config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Implementation to load
    #[serde(default)]
    pub kind: ClassifierKind,

    /// Model file for `forest`
    #[serde(default = "default_model_path")]
    pub path: Option<PathBuf>,

    /// Force all classifier calls through a single mutex
    #[serde(default)]
    pub serialize_access: bool,

    /// Fraud probability at or above which the forest predicts 1
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: f64,

    /// Settings for `heuristic`
    #[serde(default)]
    pub heuristic: HeuristicConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::default(),
            path: default_model_path(),
            serialize_access: false,
            decision_threshold: default_decision_threshold(),
            heuristic: HeuristicConfig::default(),
        }
    }
}

impl ClassifierConfig {
    /// Forest classifier reading the given model file
    pub fn forest(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ClassifierKind::Forest,
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Heuristic classifier with default thresholds
    pub fn heuristic() -> Self {
        Self {
            kind: ClassifierKind::Heuristic,
            path: None,
            ..Default::default()
        }
    }
}

/// Thresholds for the heuristic classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicConfig {
    /// Amounts strictly above this score a point
    #[serde(default = "default_high_value")]
    pub high_value_threshold: f64,

    /// Origin balance swings strictly above this score a point
    #[serde(default = "default_origin_delta")]
    pub origin_delta_threshold: f64,

    /// Points needed to predict fraud
    #[serde(default = "default_min_score")]
    pub min_score: u32,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: default_high_value(),
            origin_delta_threshold: default_origin_delta(),
            min_score: default_min_score(),
        }
    }
}

fn default_model_path() -> Option<PathBuf> {
    Some(PathBuf::from("./models/forest.json"))
}

fn default_decision_threshold() -> f64 {
    0.5
}

fn default_high_value() -> f64 {
    50_000.0
}

fn default_origin_delta() -> f64 {
    40_000.0
}

fn default_min_score() -> u32 {
    2
}
