//! Mock classifiers for testing
//!
//! Configurable implementations of the [`Classifier`] trait for exercising
//! the adapter, the decision engine, and the batch orchestrator.

use async_trait::async_trait;
use fraudguard_core::{Error, FeatureVector, Result};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use crate::{ClassificationResult, Classifier};

/// Classifier returning a fixed raw label
pub struct StubClassifier {
    name: String,
    label: i64,
    simulated_latency: Option<Duration>,
    call_count: AtomicU32,
}

impl StubClassifier {
    /// Create a stub that always returns `label`
    pub fn new(label: i64) -> Self {
        Self {
            name: "stub".to_string(),
            label,
            simulated_latency: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Stub predicting fraud
    pub fn fraud() -> Self {
        Self::new(1)
    }

    /// Stub predicting legitimate
    pub fn legitimate() -> Self {
        Self::new(0)
    }

    /// Set simulated latency for this classifier
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Get the number of times predict was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn predict(&self, _features: &FeatureVector) -> Result<ClassificationResult> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }

        Ok(ClassificationResult::new(self.label).with_model("stub"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Classifier that labels by amount: fraud strictly above `threshold`
pub struct AmountThresholdClassifier {
    threshold: f64,
}

impl AmountThresholdClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

#[async_trait]
impl Classifier for AmountThresholdClassifier {
    async fn predict(&self, features: &FeatureVector) -> Result<ClassificationResult> {
        let amount = features.values()[1];
        Ok(ClassificationResult::new(i64::from(amount > self.threshold)))
    }

    fn name(&self) -> &str {
        "amount-threshold"
    }
}

/// A classifier that always fails - for testing error paths
pub struct FailingClassifier {
    unavailable: bool,
    error_message: String,
}

impl FailingClassifier {
    /// Fails every call with `Error::ClassifierUnavailable`
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            error_message: "Simulated model outage".to_string(),
        }
    }

    /// Fails every call with `Error::Classifier`
    pub fn broken() -> Self {
        Self {
            unavailable: false,
            error_message: "Simulated classifier failure".to_string(),
        }
    }

    /// Set a custom error message
    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }
}

#[async_trait]
impl Classifier for FailingClassifier {
    async fn predict(&self, _features: &FeatureVector) -> Result<ClassificationResult> {
        if self.unavailable {
            Err(Error::classifier_unavailable(&self.error_message))
        } else {
            Err(Error::classifier(&self.error_message))
        }
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Classifier that records how many calls overlap
///
/// Declares itself unsafe for concurrent calls unless told otherwise, so the
/// adapter is expected to serialize it.
pub struct ConcurrencyProbe {
    hold: Duration,
    concurrent_safe: bool,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ConcurrencyProbe {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            concurrent_safe: false,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Declare the probe safe for concurrent calls
    pub fn concurrent(mut self) -> Self {
        self.concurrent_safe = true;
        self
    }

    /// Highest number of overlapping `predict` calls observed
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for ConcurrencyProbe {
    async fn predict(&self, _features: &FeatureVector) -> Result<ClassificationResult> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.hold).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(ClassificationResult::new(0))
    }

    fn name(&self) -> &str {
        "concurrency-probe"
    }

    fn supports_concurrent_calls(&self) -> bool {
        self.concurrent_safe
    }
}
