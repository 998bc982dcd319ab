//! Balance consistency checker
//!
//! Pure rules over a single record. Every rule is evaluated; the order of
//! [`CheckRule::ALL`] fixes the order of the reasons.

use fraudguard_core::{BalanceIssues, TransactionRecord};

/// A deterministic consistency rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckRule {
    /// Destination balance is zero before and after
    DestinationAnomaly,
    /// Origin did not decrease by exactly the amount
    OriginMismatch,
    /// Non-empty destination did not increase by exactly the amount
    DestinationMismatch,
}

impl CheckRule {
    /// All rules, in evaluation order
    pub const ALL: [CheckRule; 3] = [
        Self::DestinationAnomaly,
        Self::OriginMismatch,
        Self::DestinationMismatch,
    ];

    /// Reason recorded when the rule fires
    pub fn reason(&self) -> &'static str {
        match self {
            Self::DestinationAnomaly => "Destination balance anomaly",
            Self::OriginMismatch => "Origin balance mismatch",
            Self::DestinationMismatch => "Destination balance mismatch",
        }
    }

    /// Whether the rule fires for the record
    pub fn applies(&self, record: &TransactionRecord) -> bool {
        match self {
            Self::DestinationAnomaly => record.destination_balances_zero(),
            Self::OriginMismatch => {
                cents(record.new_balance_origin())
                    != cents(record.old_balance_origin() - record.amount())
            }
            // A zero opening balance is left to the anomaly rule.
            Self::DestinationMismatch => {
                record.old_balance_destination() != 0.0
                    && cents(record.new_balance_destination())
                        != cents(record.old_balance_destination() + record.amount())
            }
        }
    }

    fn mark(&self, issues: &mut BalanceIssues) {
        match self {
            Self::OriginMismatch => issues.origin = true,
            Self::DestinationAnomaly | Self::DestinationMismatch => issues.destination = true,
        }
    }
}

/// Outcome of running every consistency rule over one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Rules that fired, in evaluation order
    pub fired: Vec<CheckRule>,

    /// Side(s) of the transfer the violations point at
    pub issues: BalanceIssues,
}

impl CheckReport {
    /// Whether any rule fired
    pub fn triggered(&self) -> bool {
        !self.fired.is_empty()
    }

    /// Reasons for the fired rules, in order
    pub fn reasons(&self) -> Vec<String> {
        self.fired.iter().map(|rule| rule.reason().to_string()).collect()
    }
}

/// Run all consistency rules over a record
pub fn check(record: &TransactionRecord) -> CheckReport {
    let mut report = CheckReport::default();

    for rule in CheckRule::ALL {
        if rule.applies(record) {
            rule.mark(&mut report.issues);
            report.fired.push(rule);
        }
    }

    report
}

/// Round a currency value to whole cents
///
/// Stays in `f64` so balances beyond the `i64` range still compare exactly.
fn cents(value: f64) -> f64 {
    (value * 100.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(amount: f64, origin: (f64, f64), destination: (f64, f64)) -> TransactionRecord {
        TransactionRecord::builder()
            .step(1)
            .amount(amount)
            .origin(origin.0, origin.1)
            .destination(destination.0, destination.1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_consistent_record_passes() {
        let report = check(&record(5600.0, (6000.0, 400.0), (2000.0, 7600.0)));
        assert!(!report.triggered());
        assert!(!report.issues.any());
    }

    #[test]
    fn test_destination_anomaly() {
        let report = check(&record(1500.0, (2000.0, 500.0), (0.0, 0.0)));
        assert_eq!(report.fired, vec![CheckRule::DestinationAnomaly]);
        assert_eq!(report.reasons(), vec!["Destination balance anomaly"]);
        assert!(report.issues.destination);
        assert!(!report.issues.origin);
    }

    #[test]
    fn test_origin_mismatch_only() {
        // 21000 - 22000 != 3000, destination 5000 + 22000 == 27000
        let report = check(&record(22000.0, (21000.0, 3000.0), (5000.0, 27000.0)));
        assert_eq!(report.fired, vec![CheckRule::OriginMismatch]);
        assert!(report.issues.origin);
        assert!(!report.issues.destination);
    }

    #[test]
    fn test_all_reasons_accumulate_in_order() {
        let report = check(&record(100.0, (1000.0, 0.0), (0.0, 0.0)));
        assert_eq!(
            report.reasons(),
            vec!["Destination balance anomaly", "Origin balance mismatch"]
        );

        let report = check(&record(100.0, (1000.0, 0.0), (50.0, 60.0)));
        assert_eq!(
            report.reasons(),
            vec!["Origin balance mismatch", "Destination balance mismatch"]
        );
        assert!(report.issues.origin && report.issues.destination);
    }

    #[test]
    fn test_zero_opening_destination_skips_mismatch() {
        let report = check(&record(100.0, (100.0, 0.0), (0.0, 999.0)));
        assert!(!report.triggered());
    }

    #[test]
    fn test_rounding_absorbs_float_noise() {
        // 0.3 - 0.1 is 0.19999999999999998 in binary floating point
        let report = check(&record(0.1, (0.3, 0.2), (0.1, 0.2)));
        assert!(!report.triggered());
    }

    #[test]
    fn test_cent_differences_are_detected() {
        let report = check(&record(10.0, (100.0, 90.01), (5.0, 15.0)));
        assert_eq!(report.fired, vec![CheckRule::OriginMismatch]);
    }

    #[test]
    fn test_large_balances_still_compared() {
        let report = check(&record(0.0, (1e20, 5e19), (1.0, 1.0)));
        assert_eq!(report.fired, vec![CheckRule::OriginMismatch]);

        let report = check(&record(0.0, (1e20, 1e20), (2e17, 3e17)));
        assert_eq!(report.fired, vec![CheckRule::DestinationMismatch]);

        let report = check(&record(1e17, (3e17, 2e17), (1e18, 1.1e18)));
        assert!(!report.triggered());
    }

    proptest! {
        #[test]
        fn prop_zero_destination_always_fires(
            amount in 0.0f64..1e7,
            old_origin in 0.0f64..1e7,
            new_origin in 0.0f64..1e7,
        ) {
            let report = check(&record(amount, (old_origin, new_origin), (0.0, 0.0)));
            prop_assert!(report.triggered());
            prop_assert_eq!(report.fired[0], CheckRule::DestinationAnomaly);
        }

        #[test]
        fn prop_exact_transfers_pass(
            amount_cents in 0i64..100_000_000,
            origin_extra in 0i64..100_000_000,
            destination_cents in 1i64..100_000_000,
        ) {
            let amount = amount_cents as f64 / 100.0;
            let old_origin = (amount_cents + origin_extra) as f64 / 100.0;
            let new_origin = origin_extra as f64 / 100.0;
            let old_dest = destination_cents as f64 / 100.0;
            let new_dest = (destination_cents + amount_cents) as f64 / 100.0;

            let report = check(&record(amount, (old_origin, new_origin), (old_dest, new_dest)));
            prop_assert!(!report.triggered());
        }
    }
}
