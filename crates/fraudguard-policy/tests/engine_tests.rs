//! Decision engine integration tests
//!
//! Exercises the two-stage decision against stub classifiers so the rule
//! short-circuit and the classifier pass-through can be observed directly.

use fraudguard_classifiers::testing::{FailingClassifier, StubClassifier};
use fraudguard_classifiers::ClassificationAdapter;
use fraudguard_core::{Error, PreventionAction, TransactionRecord};
use fraudguard_policy::DecisionEngine;
use std::sync::Arc;

fn engine_with(stub: Arc<StubClassifier>) -> DecisionEngine {
    DecisionEngine::new(Arc::new(ClassificationAdapter::new(stub)))
}

fn consistent_record() -> TransactionRecord {
    TransactionRecord::new(3, 5600.0, 6000.0, 400.0, 2000.0, 7600.0, false).unwrap()
}

#[tokio::test]
async fn test_origin_mismatch_example() {
    let stub = Arc::new(StubClassifier::legitimate());
    let engine = engine_with(stub.clone());
    let record =
        TransactionRecord::new(2, 22000.0, 21000.0, 3000.0, 5000.0, 27000.0, true).unwrap();

    let assessment = engine.assess(&record).await.unwrap();

    assert!(assessment.verdict.rule_triggered);
    assert!(assessment.verdict.is_fraud);
    assert!(assessment
        .verdict
        .reasons
        .contains(&"Origin balance mismatch".to_string()));
    assert!(assessment.verdict.issues.origin);

    assert!(!assessment.prevention.allowed);
    assert!(assessment.prevention.actions.contains(&PreventionAction::PreFlagged));
    assert!(assessment.prevention.actions.contains(&PreventionAction::InsufficientOriginBalance));
    assert!(assessment.prevention.actions.contains(&PreventionAction::FraudDetected));
    assert!(!assessment.prevention.actions.contains(&PreventionAction::HighValue));

    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn test_origin_mismatch_high_value_variant() {
    let engine = engine_with(Arc::new(StubClassifier::legitimate()));
    let record =
        TransactionRecord::new(2, 52000.0, 21000.0, 3000.0, 5000.0, 57000.0, true).unwrap();

    let assessment = engine.assess(&record).await.unwrap();
    assert!(assessment.verdict.rule_triggered);
    assert_eq!(
        &assessment.prevention.actions[..2],
        &[PreventionAction::PreFlagged, PreventionAction::HighValue]
    );
}

#[tokio::test]
async fn test_destination_zero_example_never_calls_classifier() {
    let stub = Arc::new(StubClassifier::legitimate());
    let engine = engine_with(stub.clone());
    let record = TransactionRecord::new(1, 1500.0, 2000.0, 500.0, 0.0, 0.0, false).unwrap();

    let verdict = engine.evaluate(&record).await.unwrap();

    assert!(verdict.is_fraud);
    assert!(verdict.rule_triggered);
    assert_eq!(verdict.reasons, vec!["Destination balance anomaly"]);
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn test_rules_win_even_when_classifier_is_down() {
    let adapter = ClassificationAdapter::new(Arc::new(FailingClassifier::unavailable()));
    let engine = DecisionEngine::new(Arc::new(adapter));
    let record = TransactionRecord::new(1, 1500.0, 2000.0, 500.0, 0.0, 0.0, false).unwrap();

    let verdict = engine.evaluate(&record).await.unwrap();
    assert!(verdict.is_fraud);
}

#[tokio::test]
async fn test_consistent_record_passes_classifier_label_through() {
    let fraud_stub = Arc::new(StubClassifier::fraud());
    let verdict = engine_with(fraud_stub.clone())
        .evaluate(&consistent_record())
        .await
        .unwrap();
    assert!(verdict.is_fraud);
    assert!(!verdict.rule_triggered);
    assert_eq!(verdict.reasons, vec!["ML model prediction: Fraud"]);
    assert_eq!(fraud_stub.call_count(), 1);

    let legit_stub = Arc::new(StubClassifier::legitimate());
    let assessment = engine_with(legit_stub.clone())
        .assess(&consistent_record())
        .await
        .unwrap();
    assert!(!assessment.verdict.is_fraud);
    assert!(!assessment.verdict.rule_triggered);
    assert_eq!(assessment.verdict.reasons, vec!["ML model prediction: Not Fraud"]);
    assert!(assessment.prevention.allowed);
    assert_eq!(legit_stub.call_count(), 1);
}

#[tokio::test]
async fn test_classifier_fraud_blocks_clean_record() {
    let engine = engine_with(Arc::new(StubClassifier::fraud()));
    let assessment = engine.assess(&consistent_record()).await.unwrap();

    assert_eq!(
        assessment.prevention.actions,
        vec![PreventionAction::FraudDetected]
    );
}

#[tokio::test]
async fn test_evaluation_is_idempotent() {
    let engine = engine_with(Arc::new(StubClassifier::fraud()));
    let records = [
        consistent_record(),
        TransactionRecord::new(2, 22000.0, 21000.0, 3000.0, 5000.0, 27000.0, true).unwrap(),
        TransactionRecord::new(1, 1500.0, 2000.0, 500.0, 0.0, 0.0, false).unwrap(),
    ];

    for record in &records {
        let first = engine.assess(record).await.unwrap();
        let second = engine.assess(record).await.unwrap();
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn test_classifier_errors_are_not_defaulted() {
    let adapter = ClassificationAdapter::new(Arc::new(FailingClassifier::unavailable()));
    let engine = DecisionEngine::new(Arc::new(adapter));
    let err = engine.assess(&consistent_record()).await.unwrap_err();
    assert!(matches!(err, Error::ClassifierUnavailable(_)));

    let engine = engine_with(Arc::new(StubClassifier::new(7)));
    let err = engine.evaluate(&consistent_record()).await.unwrap_err();
    assert!(matches!(err, Error::Classifier(_)));
}
