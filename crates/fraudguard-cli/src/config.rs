//! Application configuration

use fraudguard_batch::BatchConfig;
use fraudguard_classifiers::ClassifierConfig;
use fraudguard_policy::PolicyConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::{Cli, Commands};

/// Contents of `fraudguard.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &Path, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if config_path.exists() {
            Self::from_yaml(&std::fs::read_to_string(config_path)?)?
        } else {
            Self::default()
        };

        if let Some(kind) = cli.classifier {
            config.classifier.kind = kind;
        }

        if let Some(model) = &cli.model {
            config.classifier.path = Some(model.clone());
        }

        if let Commands::Batch {
            workers,
            timeout_ms,
            ..
        } = &cli.command
        {
            if let Some(workers) = workers {
                config.batch.workers = *workers;
            }
            if let Some(timeout_ms) = timeout_ms {
                config.batch.record_timeout_ms = *timeout_ms;
            }
        }

        config.policy.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
