//! Metrics collection and reporting

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metric names emitted through the `metrics` facade
pub mod names {
    pub const EVALUATIONS_TOTAL: &str = "fraudguard_evaluations_total";
    pub const RULE_TRIGGERS_TOTAL: &str = "fraudguard_rule_triggers_total";
    pub const CLASSIFIER_CALLS_TOTAL: &str = "fraudguard_classifier_calls_total";
    pub const CLASSIFIER_LATENCY_US: &str = "fraudguard_classifier_latency_us";
    pub const EVALUATION_LATENCY_US: &str = "fraudguard_evaluation_latency_us";
    pub const BATCH_ROWS_TOTAL: &str = "fraudguard_batch_rows_total";
    pub const BATCHES_TOTAL: &str = "fraudguard_batches_total";
    pub const HTTP_REQUESTS_TOTAL: &str = "fraudguard_http_requests_total";
}

/// Register descriptions for every FraudGuard metric with the installed recorder
pub fn describe_metrics() {
    metrics::describe_counter!(
        names::EVALUATIONS_TOTAL,
        "Total number of records evaluated, by decision path"
    );
    metrics::describe_counter!(
        names::RULE_TRIGGERS_TOTAL,
        "Records decided by a consistency rule without consulting the classifier"
    );
    metrics::describe_counter!(
        names::CLASSIFIER_CALLS_TOTAL,
        "Total number of classifier invocations"
    );
    metrics::describe_histogram!(
        names::CLASSIFIER_LATENCY_US,
        metrics::Unit::Microseconds,
        "Classifier call latency in microseconds"
    );
    metrics::describe_histogram!(
        names::EVALUATION_LATENCY_US,
        metrics::Unit::Microseconds,
        "End-to-end record evaluation latency in microseconds"
    );
    metrics::describe_counter!(
        names::BATCH_ROWS_TOTAL,
        "Batch rows processed, by outcome"
    );
    metrics::describe_counter!(names::BATCHES_TOTAL, "Total number of batches run, by status");
    metrics::describe_counter!(
        names::HTTP_REQUESTS_TOTAL,
        "HTTP API requests, by route"
    );

    tracing::debug!("Metric descriptions registered");
}

/// Metrics collector for decision throughput and outcomes
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    evaluations: AtomicU64,
    rule_triggers: AtomicU64,
    fraud_detected: AtomicU64,
    blocked: AtomicU64,
    unresolved: AtomicU64,
    parse_errors: AtomicU64,
    total_latency_us: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                evaluations: AtomicU64::new(0),
                rule_triggers: AtomicU64::new(0),
                fraud_detected: AtomicU64::new(0),
                blocked: AtomicU64::new(0),
                unresolved: AtomicU64::new(0),
                parse_errors: AtomicU64::new(0),
                total_latency_us: AtomicU64::new(0),
            }),
        }
    }

    /// Record a completed evaluation
    pub fn record_evaluation(&self, is_fraud: bool, rule_triggered: bool, allowed: bool) {
        self.inner.evaluations.fetch_add(1, Ordering::Relaxed);
        if rule_triggered {
            self.inner.rule_triggers.fetch_add(1, Ordering::Relaxed);
        }
        if is_fraud {
            self.inner.fraud_detected.fetch_add(1, Ordering::Relaxed);
        }
        if !allowed {
            self.inner.blocked.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a record the engine could not resolve
    pub fn record_unresolved(&self) {
        self.inner.unresolved.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a row that failed to parse
    pub fn record_parse_error(&self) {
        self.inner.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record evaluation latency
    pub fn record_latency(&self, latency_us: u64) {
        self.inner
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            evaluations: self.inner.evaluations.load(Ordering::Relaxed),
            rule_triggers: self.inner.rule_triggers.load(Ordering::Relaxed),
            fraud_detected: self.inner.fraud_detected.load(Ordering::Relaxed),
            blocked: self.inner.blocked.load(Ordering::Relaxed),
            unresolved: self.inner.unresolved.load(Ordering::Relaxed),
            parse_errors: self.inner.parse_errors.load(Ordering::Relaxed),
            total_latency_us: self.inner.total_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub evaluations: u64,
    pub rule_triggers: u64,
    pub fraud_detected: u64,
    pub blocked: u64,
    pub unresolved: u64,
    pub parse_errors: u64,
    pub total_latency_us: u64,
}

impl MetricsSnapshot {
    /// Calculate average latency per evaluation
    pub fn avg_latency_us(&self) -> u64 {
        if self.evaluations == 0 {
            0
        } else {
            self.total_latency_us / self.evaluations
        }
    }

    /// Share of evaluations judged fraudulent
    pub fn fraud_rate(&self) -> f64 {
        if self.evaluations == 0 {
            0.0
        } else {
            self.fraud_detected as f64 / self.evaluations as f64
        }
    }

    /// Share of evaluations decided without the classifier
    pub fn rule_trigger_rate(&self) -> f64 {
        if self.evaluations == 0 {
            0.0
        } else {
            self.rule_triggers as f64 / self.evaluations as f64
        }
    }
}
