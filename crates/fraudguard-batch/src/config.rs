//! Batch execution configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Batch configuration (the `batch` section of the config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Records evaluated at once; 0 means one per CPU
    #[serde(default)]
    pub workers: usize,

    /// Upper bound on a single classifier call, not counting time queued
    /// behind a serialized classifier
    #[serde(default = "default_record_timeout_ms")]
    pub record_timeout_ms: u64,
}

impl BatchConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_record_timeout(mut self, timeout: Duration) -> Self {
        self.record_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Number of concurrent evaluations, resolving 0 to the CPU count
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }

    pub fn record_timeout(&self) -> Duration {
        Duration::from_millis(self.record_timeout_ms)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            record_timeout_ms: default_record_timeout_ms(),
        }
    }
}

fn default_record_timeout_ms() -> u64 {
    5_000
}
