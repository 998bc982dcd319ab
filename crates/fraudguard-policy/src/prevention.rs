//! Prevention policy
//!
//! Derives an allow/block recommendation from the raw record and the engine's
//! verdict. Rules are checked independently of how the verdict was reached,
//! so the destination anomaly can appear here as well as in the verdict.

use fraudguard_core::{PreventionAction, PreventionOutcome, TransactionRecord, Verdict};
use tracing::debug;

use crate::PolicyConfig;

/// Allow/block recommendation rules
#[derive(Debug, Clone, Default)]
pub struct PreventionPolicy {
    config: PolicyConfig,
}

impl PreventionPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Evaluate every prevention rule, in order
    pub fn evaluate(&self, record: &TransactionRecord, verdict: &Verdict) -> PreventionOutcome {
        let mut actions = Vec::new();

        if record.is_flagged_fraud() {
            actions.push(PreventionAction::PreFlagged);
        }
        if record.amount() > self.config.high_value_threshold {
            actions.push(PreventionAction::HighValue);
        }
        if record.old_balance_origin() < record.amount() {
            actions.push(PreventionAction::InsufficientOriginBalance);
        }
        if record.destination_balances_zero() {
            actions.push(PreventionAction::DestinationAnomaly);
        }
        if verdict.is_fraud {
            actions.push(PreventionAction::FraudDetected);
        }

        let outcome = PreventionOutcome::from_actions(actions);
        debug!(
            allowed = outcome.allowed,
            actions = outcome.actions.len(),
            "Prevention policy evaluated"
        );

        outcome
    }
}
