//! FraudGuard Telemetry
//!
//! Performance metrics and decision counters for FraudGuard.
//!
//! Provides:
//! - An in-process collector with atomic counters and snapshots
//! - Descriptions for the metrics emitted through the `metrics` facade

pub mod metrics;

pub use crate::metrics::{describe_metrics, MetricsCollector, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
}
