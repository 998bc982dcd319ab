//! The shipped demo configuration, model, and sample file work together

use clap::Parser;
use fraudguard_batch::{CancellationToken, RowOutcome};
use fraudguard_cli::{AppConfig, AppState, Cli};
use std::path::PathBuf;

fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

fn demo_config() -> AppConfig {
    let cli = Cli::try_parse_from(["fraudguard", "serve"]).unwrap();
    let mut config = AppConfig::load(&demos_dir().join("fraudguard.yaml"), &cli).unwrap();
    config.classifier.path = Some(demos_dir().join("models/forest.json"));
    config
}

#[tokio::test]
async fn test_demo_batch_with_forest_model() {
    let state = AppState::from_config(&demo_config(), None).unwrap();
    let source = std::fs::File::open(demos_dir().join("sample_bulk_transactions.csv")).unwrap();

    let result = state
        .orchestrator
        .run_csv(source, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.len(), 8);
    assert_eq!(result.headers[1], "type");

    let fraud: Vec<Option<bool>> = result
        .verdicts()
        .map(|verdict| verdict.map(|v| v.is_fraud))
        .collect();
    assert_eq!(
        fraud,
        vec![
            Some(true),
            Some(true),
            Some(false),
            Some(true),
            Some(false),
            Some(false),
            Some(false),
            None,
        ]
    );

    // The large cash-out passes the rules and is caught by the model
    let large = result.entries[3].outcome.verdict().unwrap();
    assert!(!large.rule_triggered);

    // High value alone blocks without a fraud verdict
    match &result.entries[5].outcome {
        RowOutcome::Evaluated { prevention, .. } => {
            assert!(!prevention.allowed);
            assert_eq!(prevention.justification(), "High transaction amount");
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    assert!(matches!(result.entries[7].outcome, RowOutcome::ParseFailed(_)));
    assert_eq!(result.summary.parse_errors, 1);
    assert_eq!(result.summary.flagged, 1);
}

#[tokio::test]
async fn test_demo_config_values() {
    let config = demo_config();
    assert_eq!(config.policy.high_value_threshold, 50_000.0);
    assert_eq!(config.batch.workers, 0);
    assert!(!config.classifier.serialize_access);
}

#[test]
fn test_missing_model_is_unavailable() {
    let mut config = demo_config();
    config.classifier.path = Some(demos_dir().join("models/missing.json"));

    let err = AppState::from_config(&config, None).err().unwrap();
    assert!(matches!(
        err,
        fraudguard_core::Error::ClassifierUnavailable(_)
    ));
}
