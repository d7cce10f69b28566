//! Trade Reconciliation Core
//!
//! Matches two independently recorded ledgers of commodity trades, a
//! bank/clearing-side record and an exchange-side record, that describe the
//! same trades but disagree in granularity, time reference, and identifiers.
//!
//! # Architecture
//!
//! Data flows one way through three stages:
//!
//! 1. **Key derivation**: every fill maps to a business key
//!    (product, counterparty, trade date, direction)
//! 2. **Aggregation**: fills are partitioned by key on each side and summed
//!    into one [`SideSummary`] per key
//! 3. **Matching**: a full outer join over the two summary maps classifies
//!    every key as matched, mismatched, or missing on one side
//!
//! The whole pipeline is a pure function over its two immutable input
//! collections: same fills in, same records out, on a single pass.
//!
//! # Invariants
//!
//! - Every fill identity appears in exactly one summary's source refs
//! - Aggregation is invariant under fill-splitting on the exchange side
//! - The join is total: every key in either map yields exactly one record
//! - Nulls are coalesced to zero at output time only, never mid-aggregation

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod aggregate;
pub mod config;
pub mod error;
pub mod keys;
pub mod reconcile;
pub mod types;

// Re-exports
pub use aggregate::{Aggregation, SideAggregator};
pub use config::ReconConfig;
pub use error::{Error, Result};
pub use keys::DayBasis;
pub use reconcile::{Reconciler, QTY_TOLERANCE, VALUE_TOLERANCE};
pub use types::{
    BusinessKey, ClearingFill, Direction, ExecutionFill, ReconStatus, ReconSummary,
    ReconciliationRecord, RejectedFill, Side, SideSummary,
};
