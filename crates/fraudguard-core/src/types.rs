//! Core types for FraudGuard

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Number of features the classifier consumes
pub const FEATURE_COUNT: usize = 7;

/// Source column names, in feature-vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "step",
    "amount",
    "oldbalanceOrg",
    "newbalanceOrig",
    "oldbalanceDest",
    "newbalanceDest",
    "isFlaggedFraud",
];

/// A single transaction to be evaluated
///
/// Records are validated on construction and immutable afterwards. Every
/// monetary field is finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireRecord", into = "WireRecord")]
pub struct TransactionRecord {
    step: u64,
    amount: f64,
    old_balance_origin: f64,
    new_balance_origin: f64,
    old_balance_destination: f64,
    new_balance_destination: f64,
    is_flagged_fraud: bool,
}

impl TransactionRecord {
    /// Create a validated transaction record
    pub fn new(
        step: u64,
        amount: f64,
        old_balance_origin: f64,
        new_balance_origin: f64,
        old_balance_destination: f64,
        new_balance_destination: f64,
        is_flagged_fraud: bool,
    ) -> Result<Self> {
        let record = Self {
            step,
            amount,
            old_balance_origin,
            new_balance_origin,
            old_balance_destination,
            new_balance_destination,
            is_flagged_fraud,
        };
        record.validate()?;
        Ok(record)
    }

    /// Start building a record field by field
    pub fn builder() -> TransactionRecordBuilder {
        TransactionRecordBuilder::default()
    }

    fn validate(&self) -> Result<()> {
        let monetary = [
            (FEATURE_NAMES[1], self.amount),
            (FEATURE_NAMES[2], self.old_balance_origin),
            (FEATURE_NAMES[3], self.new_balance_origin),
            (FEATURE_NAMES[4], self.old_balance_destination),
            (FEATURE_NAMES[5], self.new_balance_destination),
        ];

        for (name, value) in monetary {
            if !value.is_finite() {
                return Err(Error::invalid_record(format!("{} must be finite", name)));
            }
            if value < 0.0 {
                return Err(Error::invalid_record(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Discrete time unit of the transaction
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Transferred amount
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Origin balance before the transaction
    pub fn old_balance_origin(&self) -> f64 {
        self.old_balance_origin
    }

    /// Origin balance after the transaction
    pub fn new_balance_origin(&self) -> f64 {
        self.new_balance_origin
    }

    /// Destination balance before the transaction
    pub fn old_balance_destination(&self) -> f64 {
        self.old_balance_destination
    }

    /// Destination balance after the transaction
    pub fn new_balance_destination(&self) -> f64 {
        self.new_balance_destination
    }

    /// Prior flag supplied by the upstream payment system
    pub fn is_flagged_fraud(&self) -> bool {
        self.is_flagged_fraud
    }

    /// Whether neither destination balance moved off zero
    pub fn destination_balances_zero(&self) -> bool {
        self.old_balance_destination == 0.0 && self.new_balance_destination == 0.0
    }

    /// Ordered feature vector expected by the classifier
    pub fn features(&self) -> FeatureVector {
        FeatureVector([
            self.step as f64,
            self.amount,
            self.old_balance_origin,
            self.new_balance_origin,
            self.old_balance_destination,
            self.new_balance_destination,
            if self.is_flagged_fraud { 1.0 } else { 0.0 },
        ])
    }
}

/// Builder for [`TransactionRecord`]; unset fields default to zero
#[derive(Debug, Clone, Default)]
pub struct TransactionRecordBuilder {
    step: u64,
    amount: f64,
    old_balance_origin: f64,
    new_balance_origin: f64,
    old_balance_destination: f64,
    new_balance_destination: f64,
    is_flagged_fraud: bool,
}

impl TransactionRecordBuilder {
    pub fn step(mut self, step: u64) -> Self {
        self.step = step;
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    /// Set origin balances (before, after)
    pub fn origin(mut self, old: f64, new: f64) -> Self {
        self.old_balance_origin = old;
        self.new_balance_origin = new;
        self
    }

    /// Set destination balances (before, after)
    pub fn destination(mut self, old: f64, new: f64) -> Self {
        self.old_balance_destination = old;
        self.new_balance_destination = new;
        self
    }

    pub fn flagged(mut self, flagged: bool) -> Self {
        self.is_flagged_fraud = flagged;
        self
    }

    /// Validate and build the record
    pub fn build(self) -> Result<TransactionRecord> {
        TransactionRecord::new(
            self.step,
            self.amount,
            self.old_balance_origin,
            self.new_balance_origin,
            self.old_balance_destination,
            self.new_balance_destination,
            self.is_flagged_fraud,
        )
    }
}

/// Wire shape of a record, keyed by the source column names
#[derive(Serialize, Deserialize)]
struct WireRecord {
    step: u64,
    amount: f64,
    #[serde(rename = "oldbalanceOrg")]
    old_balance_origin: f64,
    #[serde(rename = "newbalanceOrig")]
    new_balance_origin: f64,
    #[serde(rename = "oldbalanceDest")]
    old_balance_destination: f64,
    #[serde(rename = "newbalanceDest")]
    new_balance_destination: f64,
    #[serde(rename = "isFlaggedFraud")]
    is_flagged_fraud: FlagValue,
}

/// Prior flag as either 0/1 or a boolean
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Int(u8),
}

impl TryFrom<WireRecord> for TransactionRecord {
    type Error = Error;

    fn try_from(wire: WireRecord) -> Result<Self> {
        let is_flagged_fraud = match wire.is_flagged_fraud {
            FlagValue::Bool(flag) => flag,
            FlagValue::Int(0) => false,
            FlagValue::Int(1) => true,
            FlagValue::Int(other) => {
                return Err(Error::invalid_record(format!(
                    "isFlaggedFraud must be 0 or 1, got {}",
                    other
                )))
            }
        };

        TransactionRecord::new(
            wire.step,
            wire.amount,
            wire.old_balance_origin,
            wire.new_balance_origin,
            wire.old_balance_destination,
            wire.new_balance_destination,
            is_flagged_fraud,
        )
    }
}

impl From<TransactionRecord> for WireRecord {
    fn from(record: TransactionRecord) -> Self {
        Self {
            step: record.step,
            amount: record.amount,
            old_balance_origin: record.old_balance_origin,
            new_balance_origin: record.new_balance_origin,
            old_balance_destination: record.old_balance_destination,
            new_balance_destination: record.new_balance_destination,
            is_flagged_fraud: FlagValue::Int(u8::from(record.is_flagged_fraud)),
        }
    }
}

/// Ordered classifier input: the seven record fields as numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Feature values in column order
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Value of a single feature by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

/// Binary classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// 0
    Legitimate,
    /// 1
    Fraud,
}

impl Label {
    pub fn is_fraud(&self) -> bool {
        matches!(self, Self::Fraud)
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Legitimate => 0,
            Self::Fraud => 1,
        }
    }
}

impl TryFrom<i64> for Label {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::Legitimate),
            1 => Ok(Self::Fraud),
            other => Err(Error::classifier(format!(
                "classifier returned out-of-domain label {}",
                other
            ))),
        }
    }
}

/// Which side of the transfer a balance anomaly is attributable to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceIssues {
    pub origin: bool,
    pub destination: bool,
}

impl BalanceIssues {
    pub fn any(&self) -> bool {
        self.origin || self.destination
    }
}

/// Fraud decision for one record, with its reasoning trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the record is considered fraudulent
    pub is_fraud: bool,

    /// Ordered, human-readable reasons
    pub reasons: Vec<String>,

    /// True when a consistency rule decided the verdict and the classifier
    /// was not consulted
    pub rule_triggered: bool,

    /// Side(s) of the transfer implicated by consistency rules
    #[serde(default)]
    pub issues: BalanceIssues,
}

impl Verdict {
    /// Verdict decided by consistency rules
    pub fn from_rules(reasons: Vec<String>, issues: BalanceIssues) -> Self {
        Self {
            is_fraud: true,
            reasons,
            rule_triggered: true,
            issues,
        }
    }

    /// Verdict decided by the classifier
    pub fn from_label(label: Label) -> Self {
        let reason = if label.is_fraud() {
            "ML model prediction: Fraud"
        } else {
            "ML model prediction: Not Fraud"
        };

        Self {
            is_fraud: label.is_fraud(),
            reasons: vec![reason.to_string()],
            rule_triggered: false,
            issues: BalanceIssues::default(),
        }
    }

    /// Reasons joined for display or export
    pub fn reason_text(&self) -> String {
        self.reasons.join("; ")
    }
}

/// A recommended prevention action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreventionAction {
    /// Upstream system already flagged the transaction
    PreFlagged,
    /// Amount exceeds the high-value threshold
    HighValue,
    /// Origin balance cannot cover the amount
    InsufficientOriginBalance,
    /// Destination balances never moved off zero
    DestinationAnomaly,
    /// The decision engine judged the record fraudulent
    FraudDetected,
}

impl PreventionAction {
    /// Human-readable justification
    pub fn description(&self) -> &'static str {
        match self {
            Self::PreFlagged => "WARNING: Transaction is flagged as fraud and may not be safe.",
            Self::HighValue => "High transaction amount",
            Self::InsufficientOriginBalance => "Insufficient origin balance",
            Self::DestinationAnomaly => "Destination balance anomaly",
            Self::FraudDetected => "Detected fraud",
        }
    }
}

impl fmt::Display for PreventionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Allow/block recommendation for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreventionOutcome {
    /// True when no prevention rule applied
    pub allowed: bool,

    /// Triggered actions, in rule order
    pub actions: Vec<PreventionAction>,
}

impl PreventionOutcome {
    /// Build an outcome from the triggered actions
    pub fn from_actions(actions: Vec<PreventionAction>) -> Self {
        Self {
            allowed: actions.is_empty(),
            actions,
        }
    }

    /// "ALLOWED", or the triggered action descriptions joined in order
    pub fn justification(&self) -> String {
        if self.allowed {
            return "ALLOWED".to_string();
        }

        self.actions
            .iter()
            .map(PreventionAction::description)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_features_in_column_order() {
        let record = TransactionRecord::new(2, 22000.0, 21000.0, 3000.0, 5000.0, 27000.0, true)
            .unwrap();

        assert_eq!(
            record.features().values(),
            &[2.0, 22000.0, 21000.0, 3000.0, 5000.0, 27000.0, 1.0]
        );
    }

    #[test]
    fn test_rejects_negative_amount() {
        let err = TransactionRecord::builder().amount(-1.0).build().unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
    }

    #[test]
    fn test_rejects_non_finite_balance() {
        let result = TransactionRecord::builder()
            .origin(f64::NAN, 0.0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_json_uses_column_names() {
        let json = r#"{
            "step": 1, "amount": 1500, "oldbalanceOrg": 2000, "newbalanceOrig": 500,
            "oldbalanceDest": 0, "newbalanceDest": 0, "isFlaggedFraud": 0
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.amount(), 1500.0);
        assert!(!record.is_flagged_fraud());

        let value = serde_json::to_value(record).unwrap();
        assert_eq!(value["oldbalanceOrg"], 2000.0);
        assert_eq!(value["isFlaggedFraud"], 0);
    }

    #[test]
    fn test_json_accepts_boolean_flag() {
        let json = r#"{
            "step": 1, "amount": 1, "oldbalanceOrg": 1, "newbalanceOrig": 0,
            "oldbalanceDest": 1, "newbalanceDest": 2, "isFlaggedFraud": true
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_flagged_fraud());
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        let negative = r#"{
            "step": 1, "amount": -5, "oldbalanceOrg": 1, "newbalanceOrig": 0,
            "oldbalanceDest": 1, "newbalanceDest": 2, "isFlaggedFraud": 0
        }"#;
        assert!(serde_json::from_str::<TransactionRecord>(negative).is_err());

        let bad_flag = r#"{
            "step": 1, "amount": 5, "oldbalanceOrg": 1, "newbalanceOrig": 0,
            "oldbalanceDest": 1, "newbalanceDest": 2, "isFlaggedFraud": 2
        }"#;
        assert!(serde_json::from_str::<TransactionRecord>(bad_flag).is_err());
    }

    #[test]
    fn test_label_domain() {
        assert_eq!(Label::try_from(0).unwrap(), Label::Legitimate);
        assert_eq!(Label::try_from(1).unwrap(), Label::Fraud);
        assert!(matches!(Label::try_from(2), Err(Error::Classifier(_))));
        assert!(Label::try_from(-1).is_err());
    }

    #[test]
    fn test_verdict_from_label() {
        let fraud = Verdict::from_label(Label::Fraud);
        assert!(fraud.is_fraud);
        assert!(!fraud.rule_triggered);
        assert_eq!(fraud.reason_text(), "ML model prediction: Fraud");

        let legit = Verdict::from_label(Label::Legitimate);
        assert!(!legit.is_fraud);
        assert_eq!(legit.reasons, vec!["ML model prediction: Not Fraud"]);
    }

    #[test]
    fn test_prevention_justification() {
        assert_eq!(PreventionOutcome::from_actions(vec![]).justification(), "ALLOWED");

        let outcome = PreventionOutcome::from_actions(vec![
            PreventionAction::HighValue,
            PreventionAction::FraudDetected,
        ]);
        assert!(!outcome.allowed);
        assert_eq!(
            outcome.justification(),
            "High transaction amount | Detected fraud"
        );
    }

    proptest! {
        #[test]
        fn prop_valid_records_round_trip_features(
            step in 0u64..1_000,
            amount in 0.0f64..1e9,
            obo in 0.0f64..1e9,
            nbo in 0.0f64..1e9,
            obd in 0.0f64..1e9,
            nbd in 0.0f64..1e9,
            flagged in any::<bool>(),
        ) {
            let record = TransactionRecord::new(step, amount, obo, nbo, obd, nbd, flagged).unwrap();
            let features = record.features();
            prop_assert_eq!(features.get(0), Some(step as f64));
            prop_assert_eq!(features.get(1), Some(amount));
            prop_assert_eq!(features.get(6), Some(if flagged { 1.0 } else { 0.0 }));
            prop_assert_eq!(features.get(7), None);
        }
    }
}
