//! Error types for the ingestion pipeline

use thiserror::Error;

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Ingestion errors
///
/// Only stream-level failures are errors; a malformed row is counted in the
/// [`IngestReport`](crate::types::IngestReport) and skipped, so bad data
/// never surfaces as an exception downstream.
#[derive(Error, Debug)]
pub enum IngestError {
    /// CSV reading failed at the stream level
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reconciliation window bounds are inverted
    #[error("Invalid window: {from} is after {to}")]
    InvalidWindow {
        /// Window start
        from: chrono::NaiveDate,
        /// Window end
        to: chrono::NaiveDate,
    },
}
