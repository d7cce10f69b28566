//! Ingestion pipeline for trade reconciliation
//!
//! Loads raw fills from tabular sources and normalizes time zone and type
//! representations before they reach the reconciliation core:
//!
//! - **Clearing side**: European-format CSV (semicolon separator, comma
//!   decimals, `dd/mm/YYYY` dates) as exported by the bank clearing system.
//!   Rows are flagged incomplete when price is missing, the local trade date
//!   is converted to UTC in the bank's reporting zone, and the pre-multiplied
//!   `total_value` is derived.
//! - **Exchange side**: comma-separated execution export with RFC 3339 UTC
//!   timestamps and signed quantities.
//!
//! Malformed rows are counted and reported, never passed downstream; the
//! core only ever sees well-formed fills. The [`StagingStore`] holds the
//! current snapshot of fills per reconciliation window with idempotent
//! replace semantics (wipe-and-reload, never append-only history).

pub mod clearing;
pub mod config;
pub mod error;
pub mod execution;
pub mod store;
pub mod types;

// Re-exports
pub use clearing::ClearingCsvReader;
pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use execution::ExecutionCsvReader;
pub use store::{StagingStore, Window};
pub use types::IngestReport;
