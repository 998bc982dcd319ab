//! Shared application state

use fraudguard_batch::{BatchConfig, BatchOrchestrator};
use fraudguard_classifiers::load_adapter;
use fraudguard_core::Result;
use fraudguard_policy::DecisionEngine;
use fraudguard_telemetry::MetricsCollector;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::AppConfig;

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DecisionEngine>,

    pub orchestrator: Arc<BatchOrchestrator>,

    /// Aggregate decision counters across requests
    pub collector: MetricsCollector,

    /// Prometheus exporter handle, when a recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,

    /// Cancelled on shutdown; batches run under child tokens
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Load the configured classifier and build the engine around it
    pub fn from_config(config: &AppConfig, metrics_handle: Option<PrometheusHandle>) -> Result<Self> {
        let adapter = load_adapter(&config.classifier)?;
        info!(
            classifier = adapter.classifier_name(),
            serialized = adapter.is_serialized(),
            "Classifier loaded"
        );

        let engine = DecisionEngine::with_policy(Arc::new(adapter), config.policy.clone());
        Ok(Self::new(Arc::new(engine), config.batch.clone(), metrics_handle))
    }

    pub fn new(
        engine: Arc<DecisionEngine>,
        batch: BatchConfig,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        let collector = MetricsCollector::new();
        let orchestrator =
            BatchOrchestrator::new(Arc::clone(&engine), batch).with_metrics(collector.clone());

        Self {
            engine,
            orchestrator: Arc::new(orchestrator),
            collector,
            metrics_handle,
            shutdown: CancellationToken::new(),
        }
    }
}
