//! FraudGuard Classifiers
//!
//! The classification oracle consulted by the decision engine once a record
//! passes the consistency rules.
//!
//! - [`Classifier`] is the narrow prediction interface every model implements
//! - [`ClassificationAdapter`] turns a record into the ordered feature vector,
//!   enforces the binary label domain, and serializes access to classifiers
//!   that cannot be called concurrently
//! - [`ForestClassifier`] evaluates a pre-trained tree ensemble exported to
//!   JSON or YAML
//! - [`HeuristicClassifier`] is a deterministic scorer for demos and tests

pub mod adapter;
pub mod classifier;
pub mod config;
pub mod forest;
pub mod heuristic;
pub mod model_loader;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use adapter::ClassificationAdapter;
pub use classifier::{ClassificationResult, Classifier};
pub use config::{ClassifierConfig, ClassifierKind, HeuristicConfig};
pub use forest::{ForestClassifier, ForestModel, TreeNode};
pub use heuristic::HeuristicClassifier;
pub use model_loader::{load_adapter, load_classifier, load_forest_model, ModelFormat};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::adapter::ClassificationAdapter;
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::config::{ClassifierConfig, ClassifierKind};
    pub use crate::forest::ForestClassifier;
    pub use crate::heuristic::HeuristicClassifier;
}
