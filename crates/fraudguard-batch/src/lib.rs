//! FraudGuard Batch
//!
//! Bulk evaluation of CSV transaction files.
//!
//! This crate provides:
//! - Header validation against the required feature columns
//! - Row-local parsing of CSV rows into typed transaction records
//! - A concurrent, order-preserving, cancellable batch orchestrator
//! - Export of results as the input columns plus the decision columns

pub mod config;
pub mod export;
pub mod orchestrator;
pub mod parser;
pub mod result;
pub mod schema;

pub use config::BatchConfig;
pub use export::{to_csv_string, write_csv, FRAUD_DETECTED, FRAUD_REASON, PREVENTION_ACTION};
pub use orchestrator::BatchOrchestrator;
pub use parser::RowParser;
pub use result::{BatchEntry, BatchResult, BatchSummary, RowOutcome};
pub use schema::{ColumnMap, REQUIRED_COLUMNS};

pub use tokio_util::sync::CancellationToken;
