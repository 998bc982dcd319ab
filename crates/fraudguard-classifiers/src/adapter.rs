//! Classification adapter
//!
//! Wraps a [`Classifier`] behind the stable `classify(record) -> label`
//! interface used by the decision engine.

use fraudguard_core::{Error, Label, Result, TransactionRecord};
use fraudguard_telemetry::metrics::names;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::Classifier;

/// Stable prediction interface over a loaded classifier
///
/// The adapter holds nothing but the classifier reference and, for
/// classifiers that cannot be called concurrently, a mutex that serializes
/// every call.
pub struct ClassificationAdapter {
    classifier: Arc<dyn Classifier>,
    serial: Option<Mutex<()>>,
}

impl ClassificationAdapter {
    /// Wrap a classifier, serializing access if it requires it
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        let serial = (!classifier.supports_concurrent_calls()).then(|| Mutex::new(()));
        Self { classifier, serial }
    }

    /// Wrap a classifier and always serialize access to it
    pub fn serialized(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            serial: Some(Mutex::new(())),
        }
    }

    /// Name of the wrapped classifier
    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Whether calls go through the serializing mutex
    pub fn is_serialized(&self) -> bool {
        self.serial.is_some()
    }

    /// Classify a record
    ///
    /// Fails if the classifier fails or returns anything other than 0 or 1.
    pub async fn classify(&self, record: &TransactionRecord) -> Result<Label> {
        self.classify_within(record, None).await
    }

    /// Classify a record, giving the classifier call at most `limit`
    ///
    /// The limit starts once the serializing mutex is held, so time spent
    /// queued behind other callers does not count against it. Expiry is
    /// [`Error::Timeout`].
    pub async fn classify_within(
        &self,
        record: &TransactionRecord,
        limit: Option<Duration>,
    ) -> Result<Label> {
        let features = record.features();

        let guard = match &self.serial {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let start = Instant::now();
        let result = match limit {
            Some(limit) => tokio::time::timeout(limit, self.classifier.predict(&features))
                .await
                .unwrap_or(Err(Error::Timeout)),
            None => self.classifier.predict(&features).await,
        };
        drop(guard);

        let elapsed_us = start.elapsed().as_micros() as u64;
        metrics::counter!(names::CLASSIFIER_CALLS_TOTAL).increment(1);
        metrics::histogram!(names::CLASSIFIER_LATENCY_US).record(elapsed_us as f64);

        let result = result.map_err(|e| {
            warn!(classifier = %self.classifier.name(), error = %e, "Classifier call failed");
            e
        })?;

        let label = Label::try_from(result.label)?;

        debug!(
            classifier = %self.classifier.name(),
            label = result.label,
            score = ?result.score,
            latency_us = elapsed_us,
            "Classified record"
        );

        Ok(label)
    }
}

impl std::fmt::Debug for ClassificationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationAdapter")
            .field("classifier", &self.classifier.name())
            .field("serialized", &self.is_serialized())
            .finish()
    }
}
