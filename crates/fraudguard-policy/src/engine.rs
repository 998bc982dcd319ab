//! Two-stage decision engine
//!
//! Stage 1 runs the consistency rules. Any violation decides the verdict and
//! the classifier is never called. Stage 2 consults the classifier only for
//! records whose balance arithmetic is sound.

use fraudguard_classifiers::ClassificationAdapter;
use fraudguard_core::{PreventionOutcome, Result, TransactionRecord, Verdict};
use fraudguard_telemetry::metrics::names;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::{checker, PolicyConfig, PreventionPolicy};

/// Verdict and prevention outcome for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub verdict: Verdict,
    pub prevention: PreventionOutcome,
}

/// Decision engine
pub struct DecisionEngine {
    adapter: Arc<ClassificationAdapter>,
    prevention: PreventionPolicy,
}

impl DecisionEngine {
    /// Create an engine with the default prevention policy
    pub fn new(adapter: Arc<ClassificationAdapter>) -> Self {
        Self::with_policy(adapter, PolicyConfig::default())
    }

    /// Create an engine with a configured prevention policy
    pub fn with_policy(adapter: Arc<ClassificationAdapter>, config: PolicyConfig) -> Self {
        Self {
            adapter,
            prevention: PreventionPolicy::new(config),
        }
    }

    /// The prevention policy used by [`DecisionEngine::assess`]
    pub fn prevention_policy(&self) -> &PreventionPolicy {
        &self.prevention
    }

    /// Name of the classifier consulted in stage 2
    pub fn classifier_name(&self) -> &str {
        self.adapter.classifier_name()
    }

    /// Produce the verdict for one record
    pub async fn evaluate(&self, record: &TransactionRecord) -> Result<Verdict> {
        self.evaluate_within(record, None).await
    }

    /// Produce the verdict, bounding the classifier call by `limit`
    pub async fn evaluate_within(
        &self,
        record: &TransactionRecord,
        limit: Option<Duration>,
    ) -> Result<Verdict> {
        let start = Instant::now();
        let report = checker::check(record);

        let verdict = if report.triggered() {
            metrics::counter!(names::RULE_TRIGGERS_TOTAL).increment(1);
            metrics::counter!(names::EVALUATIONS_TOTAL, "path" => "rule").increment(1);
            Verdict::from_rules(report.reasons(), report.issues)
        } else {
            let label = self.adapter.classify_within(record, limit).await?;
            metrics::counter!(names::EVALUATIONS_TOTAL, "path" => "model").increment(1);
            Verdict::from_label(label)
        };

        let elapsed_us = start.elapsed().as_micros() as u64;
        metrics::histogram!(names::EVALUATION_LATENCY_US).record(elapsed_us as f64);

        debug!(
            step = record.step(),
            amount = record.amount(),
            is_fraud = verdict.is_fraud,
            rule_triggered = verdict.rule_triggered,
            reasons = %verdict.reason_text(),
            latency_us = elapsed_us,
            "Evaluated transaction"
        );

        Ok(verdict)
    }

    /// Produce the verdict and the prevention outcome for one record
    pub async fn assess(&self, record: &TransactionRecord) -> Result<Assessment> {
        self.assess_within(record, None).await
    }

    /// [`assess`](Self::assess) with a bound on the classifier call
    pub async fn assess_within(
        &self,
        record: &TransactionRecord,
        limit: Option<Duration>,
    ) -> Result<Assessment> {
        let verdict = self.evaluate_within(record, limit).await?;
        let prevention = self.prevention.evaluate(record, &verdict);
        Ok(Assessment {
            verdict,
            prevention,
        })
    }
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("adapter", &self.adapter)
            .field("prevention", &self.prevention)
            .finish()
    }
}
