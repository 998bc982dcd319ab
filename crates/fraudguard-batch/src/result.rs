//! Batch results

use fraudguard_core::{Error, PreventionOutcome, RowParseError, TransactionRecord, Verdict};
use serde::Serialize;

/// What happened to one input row
#[derive(Debug)]
pub enum RowOutcome {
    /// The record was decided
    Evaluated {
        record: TransactionRecord,
        verdict: Verdict,
        prevention: PreventionOutcome,
    },

    /// The row could not be parsed into a record
    ParseFailed(RowParseError),

    /// The record parsed but no label could be produced for it
    Unresolved {
        record: TransactionRecord,
        error: Error,
    },

    /// The batch was cancelled before the row was scheduled
    Cancelled,
}

impl RowOutcome {
    /// Verdict, if the row was decided
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            Self::Evaluated { verdict, .. } => Some(verdict),
            _ => None,
        }
    }

    /// Short outcome label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Evaluated { .. } => "evaluated",
            Self::ParseFailed(_) => "parse_failed",
            Self::Unresolved { .. } => "unresolved",
            Self::Cancelled => "cancelled",
        }
    }

    /// Why the row has no verdict, for rows that have none
    pub fn unresolved_reason(&self) -> Option<String> {
        match self {
            Self::Evaluated { .. } => None,
            Self::ParseFailed(e) => Some(e.to_string()),
            Self::Unresolved { error, .. } => Some(error.to_string()),
            Self::Cancelled => Some("cancelled".to_string()),
        }
    }
}

/// One input row and its outcome
#[derive(Debug)]
pub struct BatchEntry {
    /// 0-based data row index
    pub index: usize,

    /// Raw source fields, in header order
    pub fields: Vec<String>,

    pub outcome: RowOutcome,
}

/// Aggregate counts over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub fraud: usize,
    /// Records carrying the upstream `isFlaggedFraud` flag
    pub flagged: usize,
    /// Prevention outcomes that were not allowed
    pub blocked: usize,
    pub rule_triggered: usize,
    pub parse_errors: usize,
    pub unresolved: usize,
    pub cancelled: usize,
}

impl BatchSummary {
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };

        for entry in entries {
            match &entry.outcome {
                RowOutcome::Evaluated {
                    record,
                    verdict,
                    prevention,
                } => {
                    summary.fraud += usize::from(verdict.is_fraud);
                    summary.rule_triggered += usize::from(verdict.rule_triggered);
                    summary.blocked += usize::from(!prevention.allowed);
                    summary.flagged += usize::from(record.is_flagged_fraud());
                }
                RowOutcome::Unresolved { record, .. } => {
                    summary.unresolved += 1;
                    summary.flagged += usize::from(record.is_flagged_fraud());
                }
                RowOutcome::ParseFailed(_) => summary.parse_errors += 1,
                RowOutcome::Cancelled => summary.cancelled += 1,
            }
        }

        summary
    }
}

/// Ordered outcome of a batch run
#[derive(Debug)]
pub struct BatchResult {
    /// Source header, or the feature names for pre-built records
    pub headers: Vec<String>,

    /// One entry per input row, in input order
    pub entries: Vec<BatchEntry>,

    pub summary: BatchSummary,

    /// Whether the run stopped early on cancellation
    pub cancelled: bool,
}

impl BatchResult {
    pub fn new(headers: Vec<String>, entries: Vec<BatchEntry>, cancelled: bool) -> Self {
        let summary = BatchSummary::from_entries(&entries);
        Self {
            headers,
            entries,
            summary,
            cancelled,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Verdicts in input order, `None` for rows without one
    pub fn verdicts(&self) -> impl Iterator<Item = Option<&Verdict>> {
        self.entries.iter().map(|entry| entry.outcome.verdict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudguard_core::{Label, PreventionAction};

    fn record(flagged: bool) -> TransactionRecord {
        TransactionRecord::builder()
            .amount(10.0)
            .origin(10.0, 0.0)
            .destination(1.0, 11.0)
            .flagged(flagged)
            .build()
            .unwrap()
    }

    fn entry(index: usize, outcome: RowOutcome) -> BatchEntry {
        BatchEntry {
            index,
            fields: Vec::new(),
            outcome,
        }
    }

    #[test]
    fn test_summary_counts() {
        let entries = vec![
            entry(
                0,
                RowOutcome::Evaluated {
                    record: record(true),
                    verdict: Verdict::from_label(Label::Fraud),
                    prevention: PreventionOutcome::from_actions(vec![
                        PreventionAction::PreFlagged,
                        PreventionAction::FraudDetected,
                    ]),
                },
            ),
            entry(
                1,
                RowOutcome::Evaluated {
                    record: record(false),
                    verdict: Verdict::from_label(Label::Legitimate),
                    prevention: PreventionOutcome::from_actions(Vec::new()),
                },
            ),
            entry(2, RowOutcome::ParseFailed(RowParseError::unreadable(2, "bad"))),
            entry(
                3,
                RowOutcome::Unresolved {
                    record: record(false),
                    error: Error::Timeout,
                },
            ),
            entry(4, RowOutcome::Cancelled),
        ];

        let summary = BatchSummary::from_entries(&entries);
        assert_eq!(
            summary,
            BatchSummary {
                total: 5,
                fraud: 1,
                flagged: 1,
                blocked: 1,
                rule_triggered: 0,
                parse_errors: 1,
                unresolved: 1,
                cancelled: 1,
            }
        );
    }

    #[test]
    fn test_unresolved_reasons() {
        assert_eq!(
            RowOutcome::Cancelled.unresolved_reason().as_deref(),
            Some("cancelled")
        );
        let timeout = RowOutcome::Unresolved {
            record: record(false),
            error: Error::Timeout,
        };
        assert_eq!(
            timeout.unresolved_reason().as_deref(),
            Some("operation timed out")
        );
        assert_eq!(timeout.kind(), "unresolved");
    }
}
