//! Tree-ensemble classifier
//!
//! Evaluates a random-forest style model exported as flat per-tree node
//! arrays. Split nodes send a sample left when `x[feature] <= threshold`;
//! leaves hold class weights `[legitimate, fraud]`. The prediction is the mean
//! per-tree fraud probability; fraud is predicted only when it exceeds the
//! decision threshold.

use async_trait::async_trait;
use fraudguard_core::{Error, FeatureVector, Result, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{ClassificationResult, Classifier};

/// Serialized tree-ensemble model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    /// Model identifier
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Number of input features the model was trained on
    pub n_features: usize,

    /// Trees in the ensemble
    pub trees: Vec<Tree>,
}

/// A single decision tree; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

/// Node of a decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Internal split
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node with class weights `[legitimate, fraud]`
    Leaf { value: [f64; 2] },
}

impl ForestModel {
    /// Parse and validate a model from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| Error::classifier_unavailable(format!("corrupt model: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    /// Parse and validate a model from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let model: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::classifier_unavailable(format!("corrupt model: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    /// Check the model can be evaluated against our feature vector
    ///
    /// Children must come after their parent, which rules out cycles.
    pub fn validate(&self) -> Result<()> {
        if self.n_features != FEATURE_COUNT {
            return Err(Error::classifier_unavailable(format!(
                "model expects {} features, records provide {}",
                self.n_features, FEATURE_COUNT
            )));
        }

        if self.trees.is_empty() {
            return Err(Error::classifier_unavailable("model has no trees"));
        }

        for (tree_idx, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(Error::classifier_unavailable(format!(
                    "tree {} has no nodes",
                    tree_idx
                )));
            }

            for (node_idx, node) in tree.nodes.iter().enumerate() {
                let invalid = |msg: String| {
                    Error::classifier_unavailable(format!(
                        "tree {} node {}: {}",
                        tree_idx, node_idx, msg
                    ))
                };

                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= FEATURE_COUNT {
                            return Err(invalid(format!("feature index {} out of range", feature)));
                        }
                        if !threshold.is_finite() {
                            return Err(invalid("threshold is not finite".to_string()));
                        }
                        for child in [*left, *right] {
                            if child <= node_idx || child >= tree.nodes.len() {
                                return Err(invalid(format!("child index {} out of order", child)));
                            }
                        }
                    }
                    TreeNode::Leaf { value } => {
                        let total = value[0] + value[1];
                        if value.iter().any(|v| !v.is_finite() || *v < 0.0) || total <= 0.0 {
                            return Err(invalid("leaf weights must be non-negative with a positive sum".to_string()));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Mean fraud probability across all trees
    pub fn fraud_probability(&self, features: &FeatureVector) -> f64 {
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.fraud_probability(features))
            .sum();

        sum / self.trees.len() as f64
    }
}

impl Tree {
    fn fraud_probability(&self, features: &FeatureVector) -> f64 {
        let mut idx = 0;

        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features.values()[*feature];
                    idx = if x <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value[1] / (value[0] + value[1]),
            }
        }
    }
}

/// Classifier backed by a validated [`ForestModel`]
pub struct ForestClassifier {
    model: ForestModel,
    decision_threshold: f64,
}

impl ForestClassifier {
    /// Create a classifier from a validated model
    pub fn new(model: ForestModel) -> Result<Self> {
        model.validate()?;
        Ok(Self {
            model,
            decision_threshold: 0.5,
        })
    }

    /// Set the probability above which fraud is predicted
    ///
    /// A probability equal to the threshold is legitimate.
    pub fn with_decision_threshold(mut self, threshold: f64) -> Self {
        self.decision_threshold = threshold;
        self
    }

    /// Number of trees in the ensemble
    pub fn tree_count(&self) -> usize {
        self.model.trees.len()
    }
}

#[async_trait]
impl Classifier for ForestClassifier {
    async fn predict(&self, features: &FeatureVector) -> Result<ClassificationResult> {
        let start = Instant::now();

        if features.values().iter().any(|v| !v.is_finite()) {
            return Err(Error::classifier("feature vector contains non-finite values"));
        }

        let probability = self.model.fraud_probability(features);
        let label = i64::from(probability > self.decision_threshold);

        Ok(ClassificationResult {
            label,
            score: Some(probability as f32),
            model: Some(self.model.name.clone()),
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.model.name
    }
}

fn default_model_name() -> String {
    "forest".to_string()
}
