//! Property-based tests for reconciliation invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Ref conservation: every fill identity lands in exactly one record's refs
//! - Fill-splitting invariance: splitting an execution leaves totals unchanged
//! - Merge associativity: sharded aggregation equals single-pass aggregation
//! - Join totality: every key on either side yields exactly one record
//! - Determinism: same fills in, same records out

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use recon_core::{
    BusinessKey, ClearingFill, DayBasis, Direction, ExecutionFill, Reconciler, SideAggregator,
    SideSummary,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Strategy for small positive quantities with up to 4 fractional digits
fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..20_000_000i64).prop_map(|units| Decimal::new(units, 4))
}

/// Strategy for prices with 2 fractional digits
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..50_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn product_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("PWR-NORDIC".to_string()),
        Just("GAS-UK".to_string()),
        Just("EUA".to_string()),
        Just("PWR-GER".to_string()),
    ]
}

fn counterparty_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("STATKRAFT".to_string()),
        Just("BP".to_string()),
        Just("SHELL".to_string()),
        Just("RWE".to_string()),
    ]
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Buy), Just(Direction::Sell)]
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u32..5).prop_map(|d| NaiveDate::from_ymd_opt(2025, 1, 13 + d).unwrap())
}

prop_compose! {
    fn clearing_fill_strategy()(
        trade in 1u32..500,
        seq in 1u32..5,
        product in product_strategy(),
        counterparty in counterparty_strategy(),
        direction in direction_strategy(),
        quantity in quantity_strategy(),
        price in proptest::option::of(price_strategy()),
        date in date_strategy(),
    ) -> ClearingFill {
        ClearingFill {
            trade_number: format!("T{:03}", trade),
            fill_sequence: seq,
            product,
            market: "EEX".to_string(),
            direction,
            quantity,
            price,
            counterparty,
            fee: None,
            trade_date_local: date,
            trade_date_utc: None,
            is_complete: price.is_some(),
            total_value: price.map(|p| p * quantity),
        }
    }
}

prop_compose! {
    fn execution_strategy()(
        id in 1u32..10_000,
        product in product_strategy(),
        counterparty in counterparty_strategy(),
        direction in direction_strategy(),
        quantity in quantity_strategy(),
        price in price_strategy(),
        date in date_strategy(),
        hour in 0u32..24,
    ) -> ExecutionFill {
        let signed = match direction {
            Direction::Buy => quantity,
            Direction::Sell => -quantity,
        };
        ExecutionFill {
            execution_id: format!("ex{:05x}", id),
            product,
            trade_type: "FUTURES".to_string(),
            direction,
            quantity: signed,
            trade_price: price,
            counterparty,
            trade_date_utc: Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap()),
        }
    }
}

/// Keep one generated fill per identity; duplicates never reach the core
fn dedup_clearing(fills: Vec<ClearingFill>) -> Vec<ClearingFill> {
    let mut seen = HashSet::new();
    fills
        .into_iter()
        .filter(|f| seen.insert((f.trade_number.clone(), f.fill_sequence)))
        .collect()
}

fn dedup_executions(fills: Vec<ExecutionFill>) -> Vec<ExecutionFill> {
    let mut seen = HashSet::new();
    fills
        .into_iter()
        .filter(|f| seen.insert(f.execution_id.clone()))
        .collect()
}

fn summaries_of(
    agg: recon_core::Aggregation,
) -> HashMap<BusinessKey, SideSummary> {
    agg.summaries
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: the union of bank refs across all records is every bank
    /// fill identity exactly once: aggregation drops and duplicates nothing
    #[test]
    fn prop_bank_refs_conserved(fills in proptest::collection::vec(clearing_fill_strategy(), 0..60)) {
        let fills = dedup_clearing(fills);
        let aggregator = SideAggregator::new(DayBasis::Utc);
        let bank = aggregator.aggregate_clearing(&fills);
        prop_assert!(bank.rejected.is_empty());

        let records = Reconciler::new().reconcile(&bank.summaries, &HashMap::new());

        let mut seen: Vec<String> = records
            .iter()
            .flat_map(|r| r.bank_refs.split(',').filter(|s| !s.is_empty()).map(String::from).collect::<Vec<_>>())
            .collect();
        seen.sort();

        let mut expected: Vec<String> = fills.iter().map(|f| f.source_ref()).collect();
        expected.sort();

        prop_assert_eq!(seen, expected);
    }

    /// Property: splitting one execution into two fills with half the
    /// quantity each at the same price leaves quantity and value unchanged
    #[test]
    fn prop_fill_splitting_invariance(fill in execution_strategy()) {
        let aggregator = SideAggregator::new(DayBasis::Utc);

        let whole = summaries_of(aggregator.aggregate_executions(std::slice::from_ref(&fill)));

        let mut half_a = fill.clone();
        let mut half_b = fill.clone();
        let half = fill.quantity / Decimal::TWO;
        half_a.quantity = half;
        half_b.quantity = fill.quantity - half;
        half_b.execution_id = format!("{}b", fill.execution_id);
        let split = summaries_of(aggregator.aggregate_executions(&[half_a, half_b]));

        let reconciler = Reconciler::new();
        let whole_records = reconciler.reconcile(&HashMap::new(), &whole);
        let split_records = reconciler.reconcile(&HashMap::new(), &split);

        prop_assert_eq!(whole_records.len(), 1);
        prop_assert_eq!(split_records.len(), 1);
        prop_assert_eq!(whole_records[0].exchange_quantity, split_records[0].exchange_quantity);
        prop_assert_eq!(whole_records[0].exchange_value, split_records[0].exchange_value);
    }

    /// Property: aggregating two shards and merging per-key summaries equals
    /// aggregating the concatenated input (associative merge)
    #[test]
    fn prop_sharded_aggregation_merges(
        left in proptest::collection::vec(clearing_fill_strategy(), 0..30),
        right in proptest::collection::vec(clearing_fill_strategy(), 0..30),
    ) {
        let mut all = left;
        all.extend(right);
        let all = dedup_clearing(all);
        let (left, right) = all.split_at(all.len() / 2);

        let aggregator = SideAggregator::new(DayBasis::Utc);
        let whole = summaries_of(aggregator.aggregate_clearing(&all));

        let mut merged = summaries_of(aggregator.aggregate_clearing(left));
        for (key, summary) in summaries_of(aggregator.aggregate_clearing(right)) {
            match merged.entry(key.clone()) {
                std::collections::hash_map::Entry::Occupied(mut e) => e.get_mut().merge(summary),
                std::collections::hash_map::Entry::Vacant(e) => {
                    e.insert(summary);
                }
            }
        }

        prop_assert_eq!(whole.len(), merged.len());
        for (key, summary) in &whole {
            let other = &merged[key];
            prop_assert_eq!(summary.quantity, other.quantity);
            prop_assert_eq!(summary.value, other.value);
            prop_assert_eq!(summary.fill_count, other.fill_count);
        }
    }

    /// Property: the join is total and unique; every key observed on either
    /// side appears in exactly one output record, and output is key-sorted
    #[test]
    fn prop_outer_join_totality(
        clearing in proptest::collection::vec(clearing_fill_strategy(), 0..40),
        executions in proptest::collection::vec(execution_strategy(), 0..40),
    ) {
        let clearing = dedup_clearing(clearing);
        let executions = dedup_executions(executions);

        let aggregator = SideAggregator::new(DayBasis::Utc);
        let bank = summaries_of(aggregator.aggregate_clearing(&clearing));
        let exchange = summaries_of(aggregator.aggregate_executions(&executions));

        let records = Reconciler::new().reconcile(&bank, &exchange);

        let expected: HashSet<&BusinessKey> = bank.keys().chain(exchange.keys()).collect();
        prop_assert_eq!(records.len(), expected.len());

        let mut seen = HashSet::new();
        for record in &records {
            prop_assert!(expected.contains(&record.key));
            prop_assert!(seen.insert(record.key.clone()), "duplicate key in output");
        }

        let keys: Vec<&BusinessKey> = records.iter().map(|r| &r.key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
    }

    /// Property: reconciliation is deterministic
    #[test]
    fn prop_deterministic(
        clearing in proptest::collection::vec(clearing_fill_strategy(), 0..30),
        executions in proptest::collection::vec(execution_strategy(), 0..30),
    ) {
        let clearing = dedup_clearing(clearing);
        let executions = dedup_executions(executions);

        let run = || {
            let aggregator = SideAggregator::new(DayBasis::Utc);
            let bank = summaries_of(aggregator.aggregate_clearing(&clearing));
            let exchange = summaries_of(aggregator.aggregate_executions(&executions));
            Reconciler::new().reconcile(&bank, &exchange)
        };

        let first = run();
        let second = run();

        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            prop_assert_eq!(&a.key, &b.key);
            prop_assert_eq!(a.status, b.status);
            prop_assert_eq!(a.quantity_diff, b.quantity_diff);
            prop_assert_eq!(a.value_diff, b.value_diff);
        }
    }
}
