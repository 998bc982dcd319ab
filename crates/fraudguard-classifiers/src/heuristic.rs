//! Deterministic heuristic classifier
//!
//! Scores one point per warning sign and predicts fraud once the score reaches
//! the configured minimum. Useful where no trained model is deployed, and as a
//! reproducible classifier in tests.

use async_trait::async_trait;
use fraudguard_core::{FeatureVector, Result};

use crate::{ClassificationResult, Classifier, HeuristicConfig};

/// Rule-count classifier over the raw feature vector
pub struct HeuristicClassifier {
    config: HeuristicConfig,
}

impl HeuristicClassifier {
    pub fn new(config: HeuristicConfig) -> Self {
        Self { config }
    }

    /// Number of warning signs present in the features
    pub fn score(&self, features: &FeatureVector) -> u32 {
        let [_, amount, old_origin, new_origin, old_dest, new_dest, flagged] = *features.values();

        let signs = [
            amount > self.config.high_value_threshold,
            (new_origin - old_origin).abs() > self.config.origin_delta_threshold,
            old_dest == 0.0 && new_dest == 0.0,
            flagged >= 1.0,
        ];

        signs.iter().filter(|sign| **sign).count() as u32
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new(HeuristicConfig::default())
    }
}

#[async_trait]
impl Classifier for HeuristicClassifier {
    async fn predict(&self, features: &FeatureVector) -> Result<ClassificationResult> {
        let score = self.score(features);
        let label = i64::from(score >= self.config.min_score);

        Ok(ClassificationResult::new(label)
            .with_score(score as f32)
            .with_model("heuristic"))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudguard_core::TransactionRecord;

    #[tokio::test]
    async fn test_large_transfer_scores_two() {
        let classifier = HeuristicClassifier::default();
        let record = TransactionRecord::builder()
            .amount(60_000.0)
            .origin(100_000.0, 40_000.0)
            .destination(1_000.0, 61_000.0)
            .build()
            .unwrap();

        // high value plus a 60k origin swing
        assert_eq!(classifier.score(&record.features()), 2);
        let result = classifier.predict(&record.features()).await.unwrap();
        assert_eq!(result.label, 1);
    }

    #[tokio::test]
    async fn test_quiet_record_is_legitimate() {
        let classifier = HeuristicClassifier::default();
        let record = TransactionRecord::builder()
            .amount(500.0)
            .origin(1_000.0, 500.0)
            .destination(200.0, 700.0)
            .build()
            .unwrap();

        assert_eq!(classifier.score(&record.features()), 0);
        let result = classifier.predict(&record.features()).await.unwrap();
        assert_eq!(result.label, 0);
        assert_eq!(result.score, Some(0.0));
    }

    #[tokio::test]
    async fn test_flag_plus_zero_destination() {
        let classifier = HeuristicClassifier::default();
        let record = TransactionRecord::builder()
            .amount(10.0)
            .origin(10.0, 0.0)
            .flagged(true)
            .build()
            .unwrap();

        assert_eq!(classifier.score(&record.features()), 2);
    }
}
