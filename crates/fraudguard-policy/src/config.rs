//! Prevention policy configuration

use fraudguard_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Policy configuration (the `policy` section of the config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Amounts strictly above this are flagged as high value
    #[serde(default = "default_high_value_threshold")]
    pub high_value_threshold: f64,
}

impl PolicyConfig {
    /// Load a policy configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid policy config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds that cannot be compared against amounts
    pub fn validate(&self) -> Result<()> {
        if !self.high_value_threshold.is_finite() || self.high_value_threshold < 0.0 {
            return Err(Error::config(format!(
                "high_value_threshold must be a non-negative number, got {}",
                self.high_value_threshold
            )));
        }
        Ok(())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: default_high_value_threshold(),
        }
    }
}

fn default_high_value_threshold() -> f64 {
    50_000.0
}
