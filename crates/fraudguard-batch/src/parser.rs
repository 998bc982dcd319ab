//! Row parser
//!
//! Turns one CSV row into a validated [`TransactionRecord`]. Failures are
//! reported per row and never abort the batch.

use csv::StringRecord;
use fraudguard_core::{RowParseError, TransactionRecord, FEATURE_COUNT};

use crate::schema::{ColumnMap, REQUIRED_COLUMNS};

/// Parses rows of a source whose header has been resolved
#[derive(Debug, Clone)]
pub struct RowParser {
    columns: ColumnMap,
}

impl RowParser {
    pub fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Parse the `row`-th data row (0-based, header excluded)
    pub fn parse(
        &self,
        row: usize,
        raw: &StringRecord,
    ) -> std::result::Result<TransactionRecord, RowParseError> {
        let mut values = [0.0f64; FEATURE_COUNT];
        let mut step = 0u64;
        let mut flagged = false;

        for (slot, column) in REQUIRED_COLUMNS.iter().enumerate() {
            let value = self
                .columns
                .field(raw, slot)
                .map(str::trim)
                .ok_or_else(|| RowParseError {
                    row,
                    column: Some(column.to_string()),
                    value: None,
                    message: "missing value".to_string(),
                })?;

            let fail = |message: String| RowParseError::new(row, *column, value, message);

            match slot {
                0 => step = parse_step(value).map_err(fail)?,
                6 => flagged = parse_flag(value).map_err(fail)?,
                _ => values[slot] = parse_amount(value).map_err(fail)?,
            }
        }

        TransactionRecord::new(
            step, values[1], values[2], values[3], values[4], values[5], flagged,
        )
        .map_err(|e| RowParseError::unreadable(row, e.to_string()))
    }
}

/// Non-negative integer step; integral floats such as `3.0` are accepted
fn parse_step(value: &str) -> std::result::Result<u64, String> {
    if let Ok(step) = value.parse::<u64>() {
        return Ok(step);
    }

    match value.parse::<f64>() {
        Ok(step) if step.is_finite() && step >= 0.0 && step.fract() == 0.0 => {
            // u64::MAX as f64 rounds up to 2^64, itself out of range
            if step >= u64::MAX as f64 {
                return Err("step out of range".to_string());
            }
            Ok(step as u64)
        }
        Ok(_) => Err("step must be a non-negative integer".to_string()),
        Err(_) => Err("not a number".to_string()),
    }
}

/// Finite, non-negative monetary value
fn parse_amount(value: &str) -> std::result::Result<f64, String> {
    let amount: f64 = value.parse().map_err(|_| "not a number".to_string())?;
    if !amount.is_finite() {
        return Err("must be finite".to_string());
    }
    if amount < 0.0 {
        return Err("must be non-negative".to_string());
    }
    Ok(amount)
}

fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        _ => Err("expected 0, 1, true or false".to_string()),
    }
}
