//! Model loading for configured classifiers

use fraudguard_core::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::{
    ClassificationAdapter, Classifier, ClassifierConfig, ClassifierKind, ForestClassifier,
    ForestModel, HeuristicClassifier,
};

/// Model file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Json,
    Yaml,
}

impl ModelFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            other => Err(Error::classifier_unavailable(format!(
                "unsupported model format {:?} for {}",
                other,
                path.display()
            ))),
        }
    }
}

/// Read and validate a forest model from disk
pub fn load_forest_model(path: impl AsRef<Path>) -> Result<ForestModel> {
    let path = path.as_ref();
    let format = ModelFormat::from_path(path)?;

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::classifier_unavailable(format!("cannot read model {}: {}", path.display(), e))
    })?;

    match format {
        ModelFormat::Json => ForestModel::from_json(&content),
        ModelFormat::Yaml => ForestModel::from_yaml(&content),
    }
}

/// Build the classifier described by the configuration
pub fn load_classifier(config: &ClassifierConfig) -> Result<Arc<dyn Classifier>> {
    match config.kind {
        ClassifierKind::Forest => {
            let path = config.path.as_ref().ok_or_else(|| {
                Error::classifier_unavailable("forest classifier requires a model path")
            })?;

            info!("Loading forest model from {}", path.display());
            let model = load_forest_model(path)?;
            let classifier =
                ForestClassifier::new(model)?.with_decision_threshold(config.decision_threshold);
            info!(
                "Loaded model '{}' with {} trees",
                classifier.name(),
                classifier.tree_count()
            );

            Ok(Arc::new(classifier))
        }
        ClassifierKind::Heuristic => {
            info!("Using heuristic classifier");
            Ok(Arc::new(HeuristicClassifier::new(config.heuristic.clone())))
        }
    }
}

/// Build a ready-to-use adapter from configuration
pub fn load_adapter(config: &ClassifierConfig) -> Result<ClassificationAdapter> {
    let classifier = load_classifier(config)?;

    Ok(if config.serialize_access {
        ClassificationAdapter::serialized(classifier)
    } else {
        ClassificationAdapter::new(classifier)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const STUMP: &str = r#"{
        "name": "stump",
        "n_features": 7,
        "trees": [ { "nodes": [
            { "feature": 6, "threshold": 0.5, "left": 1, "right": 2 },
            { "value": [1.0, 0.0] },
            { "value": [0.0, 1.0] }
        ] } ]
    }"#;

    fn model_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_forest_from_json() {
        let file = model_file(".json", STUMP);
        let config = ClassifierConfig::forest(file.path());

        let classifier = load_classifier(&config).unwrap();
        assert_eq!(classifier.name(), "stump");
    }

    #[test]
    fn test_missing_model_is_unavailable() {
        let config = ClassifierConfig::forest("/nonexistent/forest.json");
        let err = load_classifier(&config).err().unwrap();
        assert!(matches!(err, Error::ClassifierUnavailable(_)));
    }

    #[test]
    fn test_unknown_extension_is_unavailable() {
        let file = model_file(".pkl", STUMP);
        let err = load_classifier(&ClassifierConfig::forest(file.path()))
            .err()
            .unwrap();
        assert!(matches!(err, Error::ClassifierUnavailable(_)));
    }

    #[test]
    fn test_forest_without_path() {
        let config = ClassifierConfig {
            path: None,
            ..Default::default()
        };
        assert!(load_classifier(&config).is_err());
    }

    #[test]
    fn test_adapter_honours_serialize_access() {
        let mut config = ClassifierConfig::heuristic();
        assert!(!load_adapter(&config).unwrap().is_serialized());

        config.serialize_access = true;
        assert!(load_adapter(&config).unwrap().is_serialized());
    }
}
