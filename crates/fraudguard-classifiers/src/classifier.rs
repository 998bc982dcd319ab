//! Classifier trait and common types

use async_trait::async_trait;
use fraudguard_core::{FeatureVector, Result};

/// Trait for all classifiers
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Predict a raw label for the given feature vector
    ///
    /// Implementations return the label exactly as the model produced it;
    /// domain checking happens in the adapter.
    async fn predict(&self, features: &FeatureVector) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Whether `predict` may run on several tasks at once
    fn supports_concurrent_calls(&self) -> bool {
        true
    }
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Raw label (0 = legitimate, 1 = fraud for well-behaved models)
    pub label: i64,

    /// Fraud probability or score, if the model exposes one
    pub score: Option<f32>,

    /// Model name or version
    pub model: Option<String>,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: i64) -> Self {
        Self {
            label,
            score: None,
            model: None,
            latency_us: 0,
        }
    }

    /// Attach a score
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Attach the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
