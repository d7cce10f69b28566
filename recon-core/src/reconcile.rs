//! Cross-side matching and discrepancy classification
//!
//! Full outer join over the two summary maps: every business key present on
//! either side produces exactly one [`ReconciliationRecord`]. The join is
//! total (no input shape fails it) and deterministic, with output sorted by
//! business key.

use crate::types::{BusinessKey, ReconStatus, ReconSummary, ReconciliationRecord, SideSummary};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeSet, HashMap};

/// Quantity tolerance: quantities are exact contract units, so only decimal
/// rounding noise is absorbed
pub const QTY_TOLERANCE: Decimal = dec!(0.0001);

/// Value tolerance: looser than quantity because values accumulate rounding
/// from price multiplication
pub const VALUE_TOLERANCE: Decimal = dec!(0.01);

/// Matches aggregated summaries across sides and classifies each key
///
/// Pure computation over its two inputs; tolerances are fixed constants, not
/// per-call parameters.
#[derive(Debug, Clone, Default)]
pub struct Reconciler;

impl Reconciler {
    /// Create a new reconciler
    pub fn new() -> Self {
        Self
    }

    /// Full outer join of the two summary maps, sorted by business key
    ///
    /// Missing-side quantities and values, and value totals that stayed
    /// null through aggregation, are coalesced to zero here, at output time
    /// only.
    pub fn reconcile(
        &self,
        bank: &HashMap<BusinessKey, SideSummary>,
        exchange: &HashMap<BusinessKey, SideSummary>,
    ) -> Vec<ReconciliationRecord> {
        let keys: BTreeSet<&BusinessKey> = bank.keys().chain(exchange.keys()).collect();

        keys.into_iter()
            .map(|key| self.build_record(key, bank.get(key), exchange.get(key)))
            .collect()
    }

    fn build_record(
        &self,
        key: &BusinessKey,
        bank: Option<&SideSummary>,
        exchange: Option<&SideSummary>,
    ) -> ReconciliationRecord {
        let bank_quantity = bank.map(|s| s.quantity).unwrap_or(Decimal::ZERO);
        let exchange_quantity = exchange.map(|s| s.quantity).unwrap_or(Decimal::ZERO);
        let bank_value = bank.and_then(|s| s.value).unwrap_or(Decimal::ZERO);
        let exchange_value = exchange.and_then(|s| s.value).unwrap_or(Decimal::ZERO);

        let quantity_diff = bank_quantity - exchange_quantity;
        let value_diff = bank_value - exchange_value;

        ReconciliationRecord {
            key: key.clone(),
            bank_quantity,
            exchange_quantity,
            quantity_diff,
            bank_value,
            exchange_value,
            value_diff,
            bank_refs: bank.map(|s| s.joined_refs()).unwrap_or_default(),
            exchange_refs: exchange.map(|s| s.joined_refs()).unwrap_or_default(),
            status: classify(bank.is_some(), exchange.is_some(), quantity_diff, value_diff),
        }
    }

    /// Run statistics over a set of reconciliation records
    ///
    /// `alert_threshold` marks a record critical when its absolute value
    /// difference reaches the threshold or a side is missing entirely.
    pub fn summarize(
        &self,
        records: &[ReconciliationRecord],
        alert_threshold: Decimal,
    ) -> ReconSummary {
        let mut summary = ReconSummary {
            total_keys: records.len(),
            matched: 0,
            qty_mismatches: 0,
            value_mismatches: 0,
            missing_in_bank: 0,
            missing_in_exchange: 0,
            critical_alerts: 0,
            total_discrepancy_amount: Decimal::ZERO,
        };

        for record in records {
            match record.status {
                ReconStatus::Matched => summary.matched += 1,
                ReconStatus::QtyMismatch => summary.qty_mismatches += 1,
                ReconStatus::ValueMismatch => summary.value_mismatches += 1,
                ReconStatus::MissingInBank => summary.missing_in_bank += 1,
                ReconStatus::MissingInExchange => summary.missing_in_exchange += 1,
            }
            summary.total_discrepancy_amount += record.value_diff.abs();
            if record.status.is_missing() || record.value_diff.abs() >= alert_threshold {
                summary.critical_alerts += 1;
            }
        }

        summary
    }
}

/// Status assignment, strict priority order: first match wins
fn classify(
    in_bank: bool,
    in_exchange: bool,
    quantity_diff: Decimal,
    value_diff: Decimal,
) -> ReconStatus {
    if !in_bank {
        ReconStatus::MissingInBank
    } else if !in_exchange {
        ReconStatus::MissingInExchange
    } else if quantity_diff.abs() > QTY_TOLERANCE {
        ReconStatus::QtyMismatch
    } else if value_diff.abs() > VALUE_TOLERANCE {
        ReconStatus::ValueMismatch
    } else {
        ReconStatus::Matched
    }
}
