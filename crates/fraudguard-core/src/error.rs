//! Error types for FraudGuard

use std::fmt;

/// Result type alias using FraudGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for FraudGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Batch source is missing required columns
    #[error("schema error: missing required columns: {}", missing.join(", "))]
    Schema {
        /// Every required column absent from the source header
        missing: Vec<String>,
    },

    /// A single row could not be parsed into a transaction record
    #[error("row parse error: {0}")]
    RowParse(#[from] RowParseError),

    /// A transaction record was built from invalid values
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// The classification model cannot be loaded or reached
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// Classifier execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// CSV reader/writer errors
    #[error("csv error: {0}")]
    Csv(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout errors
    #[error("operation timed out")]
    Timeout,

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new schema error
    pub fn schema<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Schema {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a new invalid record error
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Create a new classifier unavailable error
    pub fn classifier_unavailable(msg: impl Into<String>) -> Self {
        Self::ClassifierUnavailable(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new CSV error
    pub fn csv(msg: impl Into<String>) -> Self {
        Self::Csv(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error must abort a whole batch rather than a single row
    pub fn is_fatal_to_batch(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::ClassifierUnavailable(_) | Self::Csv(_) | Self::Io(_)
        )
    }
}

/// A row of batch input that failed typed parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowParseError {
    /// 0-based data row index (header excluded)
    pub row: usize,

    /// Column that failed, if the failure is attributable to one
    pub column: Option<String>,

    /// Offending raw value
    pub value: Option<String>,

    /// What went wrong
    pub message: String,
}

impl RowParseError {
    /// Create an error for a specific column value
    pub fn new(
        row: usize,
        column: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row,
            column: Some(column.into()),
            value: Some(value.into()),
            message: message.into(),
        }
    }

    /// Create an error for a row that could not be read at all
    pub fn unreadable(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            column: None,
            value: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.column, &self.value) {
            (Some(column), Some(value)) => write!(
                f,
                "row {}: column '{}' value '{}': {}",
                self.row, column, value, self.message
            ),
            (Some(column), None) => {
                write!(f, "row {}: column '{}': {}", self.row, column, self.message)
            }
            _ => write!(f, "row {}: {}", self.row, self.message),
        }
    }
}

impl std::error::Error for RowParseError {}
