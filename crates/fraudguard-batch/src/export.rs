//! Batch result export
//!
//! Writes the source columns followed by the decision columns, one output
//! row per input row, in input order.

use csv::WriterBuilder;
use fraudguard_core::{Error, Result};
use std::io::Write;

use crate::result::{BatchResult, RowOutcome};

pub const FRAUD_DETECTED: &str = "FraudDetected";
pub const FRAUD_REASON: &str = "FraudReason";
pub const PREVENTION_ACTION: &str = "PreventionAction";

/// Write `result` as CSV
pub fn write_csv<W: Write>(result: &BatchResult, writer: W) -> Result<()> {
    let width = result.headers.len();
    let mut out = WriterBuilder::new().flexible(true).from_writer(writer);

    let mut header: Vec<&str> = result.headers.iter().map(String::as_str).collect();
    header.extend([FRAUD_DETECTED, FRAUD_REASON, PREVENTION_ACTION]);
    out.write_record(&header).map_err(csv_error)?;

    for entry in &result.entries {
        let mut row: Vec<String> = entry.fields.clone();
        if row.len() < width {
            row.resize(width, String::new());
        }
        row.extend(decision_columns(&entry.outcome));
        out.write_record(&row).map_err(csv_error)?;
    }

    out.flush()?;
    Ok(())
}

/// Render `result` as a CSV string
pub fn to_csv_string(result: &BatchResult) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(result, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::csv(e.to_string()))
}

fn decision_columns(outcome: &RowOutcome) -> [String; 3] {
    match outcome {
        RowOutcome::Evaluated {
            verdict,
            prevention,
            ..
        } => [
            u8::from(verdict.is_fraud).to_string(),
            verdict.reason_text(),
            prevention.justification(),
        ],
        other => [
            String::new(),
            format!("unresolved: {}", other.unresolved_reason().unwrap_or_default()),
            String::new(),
        ],
    }
}

fn csv_error(e: csv::Error) -> Error {
    Error::csv(e.to_string())
}
