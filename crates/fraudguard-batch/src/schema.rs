//! Batch source schema
//!
//! Locates the required feature columns in a CSV header. The header is
//! checked as a whole before any row is read, so a source missing a column
//! fails once with every missing name rather than once per row.

use csv::StringRecord;
use fraudguard_core::{Error, Result, FEATURE_COUNT, FEATURE_NAMES};

/// Columns every batch source must carry, in feature order
pub const REQUIRED_COLUMNS: [&str; FEATURE_COUNT] = FEATURE_NAMES;

/// Positions of the required columns within a source header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [usize; FEATURE_COUNT],
    width: usize,
}

impl ColumnMap {
    /// Resolve the required columns in `headers`
    ///
    /// Header names are compared after trimming. Extra columns are ignored;
    /// when a name repeats, the first occurrence wins.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut positions = [0usize; FEATURE_COUNT];
        let mut missing = Vec::new();

        for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
            match headers.iter().position(|h| h.trim() == *name) {
                Some(position) => positions[slot] = position,
                None => missing.push(*name),
            }
        }

        if !missing.is_empty() {
            return Err(Error::schema(missing));
        }

        Ok(Self {
            positions,
            width: headers.len(),
        })
    }

    /// Header position of the `slot`-th required column
    pub fn position(&self, slot: usize) -> usize {
        self.positions[slot]
    }

    /// Number of columns in the source header
    pub fn width(&self) -> usize {
        self.width
    }

    /// Raw value of the `slot`-th required column in `row`
    pub fn field<'r>(&self, row: &'r StringRecord, slot: usize) -> Option<&'r str> {
        row.get(self.positions[slot])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> StringRecord {
        StringRecord::from(names.to_vec())
    }

    #[test]
    fn test_exact_header() {
        let map = ColumnMap::from_headers(&header(&REQUIRED_COLUMNS)).unwrap();
        for slot in 0..FEATURE_COUNT {
            assert_eq!(map.position(slot), slot);
        }
        assert_eq!(map.width(), FEATURE_COUNT);
    }

    #[test]
    fn test_reordered_header_with_extras() {
        let map = ColumnMap::from_headers(&header(&[
            "nameOrig",
            " isFlaggedFraud ",
            "newbalanceDest",
            "oldbalanceDest",
            "newbalanceOrig",
            "oldbalanceOrg",
            "amount",
            "type",
            "step",
        ]))
        .unwrap();

        assert_eq!(map.position(0), 8);
        assert_eq!(map.position(1), 6);
        assert_eq!(map.position(6), 1);
        assert_eq!(map.width(), 9);
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let err = ColumnMap::from_headers(&header(&[
            "step",
            "oldbalanceOrg",
            "newbalanceOrig",
            "oldbalanceDest",
            "newbalanceDest",
        ]))
        .unwrap_err();

        match err {
            Error::Schema { missing } => {
                assert_eq!(missing, vec!["amount", "isFlaggedFraud"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_field_lookup() {
        let map = ColumnMap::from_headers(&header(&[
            "amount",
            "step",
            "oldbalanceOrg",
            "newbalanceOrig",
            "oldbalanceDest",
            "newbalanceDest",
            "isFlaggedFraud",
        ]))
        .unwrap();
        let row = StringRecord::from(vec!["10.5", "3", "20", "9.5", "0", "0", "0"]);

        assert_eq!(map.field(&row, 0), Some("3"));
        assert_eq!(map.field(&row, 1), Some("10.5"));
    }
}
