//! FraudGuard Core
//!
//! Core types and utilities shared across FraudGuard components.
//!
//! This crate provides:
//! - The immutable transaction record and its classifier feature vector
//! - Verdicts, balance issues, and prevention outcomes
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result, RowParseError};
pub use types::{
    BalanceIssues, FeatureVector, Label, PreventionAction, PreventionOutcome, TransactionRecord,
    TransactionRecordBuilder, Verdict, FEATURE_COUNT, FEATURE_NAMES,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, RowParseError};
    pub use crate::types::{
        BalanceIssues, FeatureVector, Label, PreventionAction, PreventionOutcome,
        TransactionRecord, Verdict,
    };
}
