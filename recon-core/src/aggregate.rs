//! Per-side aggregation
//!
//! Partitions a ledger's fills by business key and folds each partition into
//! one [`SideSummary`] in a single pass. The per-key update is an associative,
//! commutative merge, so input may be sharded (e.g. by hash of
//! product+counterparty), aggregated per shard, and the partial summaries
//! merged; the join stage only needs the complete summary maps.
//!
//! # Quantity semantics
//!
//! The two sides sum quantity differently, and the asymmetry is a declared
//! convention, not an accident:
//!
//! - **bank**: arithmetic sum of the stored quantity, as recorded
//! - **exchange**: sum of absolute quantity; executions store signed
//!   quantity (negative for SELL) redundantly with the direction field, and
//!   partial fills of one direction always accumulate positively
//!
//! Making the sides symmetric would change match outcomes.

use crate::error::Error;
use crate::keys::{clearing_key, execution_key, DayBasis};
use crate::types::{BusinessKey, ClearingFill, ExecutionFill, RejectedFill, SideSummary};
use std::collections::HashMap;
use tracing::warn;

/// Result of aggregating one side's fills
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// One summary per distinct business key observed
    pub summaries: HashMap<BusinessKey, SideSummary>,

    /// Fills rejected for a missing key component
    pub rejected: Vec<RejectedFill>,
}

impl Aggregation {
    fn record(&mut self, key: BusinessKey, quantity: rust_decimal::Decimal, value: Option<rust_decimal::Decimal>, source_ref: String) {
        self.summaries
            .entry(key.clone())
            .or_insert_with(|| SideSummary::new(key))
            .record(quantity, value, source_ref);
    }

    fn reject(&mut self, err: Error) {
        if let Error::InvalidKeyComponent {
            side,
            source_ref,
            component,
        } = err
        {
            warn!(
                "Rejecting {} fill {}: missing key component '{}'",
                side, source_ref, component
            );
            self.rejected.push(RejectedFill {
                side,
                source_ref,
                component,
            });
        }
    }
}

/// Groups one ledger's fills by business key and computes per-key summaries
#[derive(Debug, Clone)]
pub struct SideAggregator {
    /// Day-assignment policy for exchange execution timestamps
    day_basis: DayBasis,
}

impl SideAggregator {
    /// Create an aggregator with the given exchange day basis
    pub fn new(day_basis: DayBasis) -> Self {
        Self { day_basis }
    }

    /// Aggregate bank clearing fills
    ///
    /// Quantity is summed as stored. Value sums the upstream-computed
    /// `total_value`; fills without one contribute nothing to the value
    /// total, and no fill is filtered out; incomplete fills still count
    /// toward quantity and the record count.
    pub fn aggregate_clearing(&self, fills: &[ClearingFill]) -> Aggregation {
        let mut agg = Aggregation::default();

        for fill in fills {
            match clearing_key(fill) {
                Ok(key) => agg.record(key, fill.quantity, fill.total_value, fill.source_ref()),
                Err(e) => agg.reject(e),
            }
        }

        agg
    }

    /// Aggregate exchange executions
    ///
    /// Quantity sums absolute values; value is computed fresh per fill as
    /// `trade_price x |quantity|` because the exchange stores no
    /// pre-multiplied total.
    pub fn aggregate_executions(&self, fills: &[ExecutionFill]) -> Aggregation {
        let mut agg = Aggregation::default();

        for fill in fills {
            match execution_key(fill, self.day_basis) {
                Ok(key) => {
                    let abs_quantity = fill.quantity.abs();
                    let value = fill.trade_price * abs_quantity;
                    agg.record(key, abs_quantity, Some(value), fill.execution_id.clone());
                }
                Err(e) => agg.reject(e),
            }
        }

        agg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn clearing_fill(
        trade_number: &str,
        seq: u32,
        direction: Direction,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> ClearingFill {
        ClearingFill {
            trade_number: trade_number.to_string(),
            fill_sequence: seq,
            product: "PWR-NORDIC".to_string(),
            market: "EEX".to_string(),
            direction,
            quantity,
            price,
            counterparty: "STATKRAFT".to_string(),
            fee: Some(dec!(10.02)),
            trade_date_local: NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
            trade_date_utc: Some(Utc.with_ymd_and_hms(2025, 1, 13, 13, 0, 0).unwrap()),
            is_complete: price.is_some(),
            total_value: price.map(|p| p * quantity),
        }
    }

    fn execution(id: &str, direction: Direction, quantity: Decimal, price: Decimal) -> ExecutionFill {
        ExecutionFill {
            execution_id: id.to_string(),
            product: "GAS-UK".to_string(),
            trade_type: "FUTURES".to_string(),
            direction,
            quantity,
            trade_price: price,
            counterparty: "BP".to_string(),
            trade_date_utc: Utc.with_ymd_and_hms(2025, 1, 14, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_clearing_fills_group_by_key() {
        let aggregator = SideAggregator::new(DayBasis::Utc);
        let fills = vec![
            clearing_fill("T001", 1, Direction::Buy, dec!(5), Some(dec!(1.76))),
            clearing_fill("T001", 2, Direction::Buy, dec!(8), Some(dec!(39.90))),
        ];

        let agg = aggregator.aggregate_clearing(&fills);
        assert_eq!(agg.summaries.len(), 1);
        assert!(agg.rejected.is_empty());

        let summary = agg.summaries.values().next().unwrap();
        assert_eq!(summary.quantity, dec!(13));
        assert_eq!(summary.value, Some(dec!(328.00)));
        assert_eq!(summary.fill_count, 2);
        assert_eq!(summary.joined_refs(), "T001-1,T001-2");
    }

    #[test]
    fn test_clearing_null_value_not_coerced_to_zero() {
        let aggregator = SideAggregator::new(DayBasis::Utc);

        // Only value-less fills: the summary stays value-None
        let fills = vec![clearing_fill("T002", 1, Direction::Sell, dec!(10), None)];
        let agg = aggregator.aggregate_clearing(&fills);
        let summary = agg.summaries.values().next().unwrap();
        assert_eq!(summary.value, None);
        assert_eq!(summary.quantity, dec!(10));
        assert_eq!(summary.fill_count, 1);

        // Mixed: the null fill is excluded from the value sum, not zeroed
        let fills = vec![
            clearing_fill("T002", 1, Direction::Sell, dec!(10), None),
            clearing_fill("T002", 2, Direction::Sell, dec!(4), Some(dec!(2.83))),
        ];
        let agg = aggregator.aggregate_clearing(&fills);
        let summary = agg.summaries.values().next().unwrap();
        assert_eq!(summary.value, Some(dec!(11.32)));
        assert_eq!(summary.fill_count, 2);
    }

    #[test]
    fn test_bank_quantity_is_arithmetic_sum() {
        let aggregator = SideAggregator::new(DayBasis::Utc);

        // A clearing system that stores sells negative nets them down
        let fills = vec![
            clearing_fill("T003", 1, Direction::Sell, dec!(-10), Some(dec!(1.16))),
            clearing_fill("T003", 2, Direction::Sell, dec!(-10), Some(dec!(1.16))),
        ];

        let agg = aggregator.aggregate_clearing(&fills);
        let summary = agg.summaries.values().next().unwrap();
        assert_eq!(summary.quantity, dec!(-20));
    }

    #[test]
    fn test_exchange_quantity_is_absolute_sum() {
        let aggregator = SideAggregator::new(DayBasis::Utc);

        // Seed scenario: bb44c1/bb44c2, SELL qty -10 each at 1.16
        let fills = vec![
            execution("bb44c1", Direction::Sell, dec!(-10), dec!(1.16)),
            execution("bb44c2", Direction::Sell, dec!(-10), dec!(1.16)),
        ];

        let agg = aggregator.aggregate_executions(&fills);
        assert_eq!(agg.summaries.len(), 1);

        let summary = agg.summaries.values().next().unwrap();
        assert_eq!(summary.quantity, dec!(20));
        assert_eq!(summary.value, Some(dec!(23.20)));
        assert_eq!(summary.joined_refs(), "bb44c1,bb44c2");
    }

    #[test]
    fn test_exchange_value_computed_from_price() {
        let aggregator = SideAggregator::new(DayBasis::Utc);

        // Seed scenario: af12e8 (5 @ 1.76) + h1k292 (8 @ 39.90) -> 328.00
        let mut a = execution("af12e8", Direction::Buy, dec!(5), dec!(1.76));
        let mut b = execution("h1k292", Direction::Buy, dec!(8), dec!(39.90));
        a.product = "PWR-NORDIC".to_string();
        a.counterparty = "STATKRAFT".to_string();
        b.product = "PWR-NORDIC".to_string();
        b.counterparty = "STATKRAFT".to_string();

        let agg = aggregator.aggregate_executions(&[a, b]);
        let summary = agg.summaries.values().next().unwrap();
        assert_eq!(summary.quantity, dec!(13));
        assert_eq!(summary.value, Some(dec!(328.00)));
    }

    #[test]
    fn test_missing_key_component_rejects_fill() {
        let aggregator = SideAggregator::new(DayBasis::Utc);

        let mut bad = clearing_fill("T004", 1, Direction::Buy, dec!(1), Some(dec!(2.0)));
        bad.product = String::new();
        let good = clearing_fill("T005", 1, Direction::Buy, dec!(1), Some(dec!(2.0)));

        let agg = aggregator.aggregate_clearing(&[bad, good]);
        assert_eq!(agg.summaries.len(), 1);
        assert_eq!(agg.rejected.len(), 1);
        assert_eq!(agg.rejected[0].source_ref, "T004-1");
        assert_eq!(agg.rejected[0].component, "product");
    }

    #[test]
    fn test_empty_input_yields_no_keys() {
        let aggregator = SideAggregator::new(DayBasis::Utc);
        assert!(aggregator.aggregate_clearing(&[]).summaries.is_empty());
        assert!(aggregator.aggregate_executions(&[]).summaries.is_empty());
    }
}
