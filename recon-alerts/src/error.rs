//! Error types for alerting and reporting

use thiserror::Error;

/// Result type for alert operations
pub type Result<T> = std::result::Result<T, AlertError>;

/// Alerting/reporting errors
#[derive(Error, Debug)]
pub enum AlertError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Email delivery failed
    #[error("Email delivery failed: {0}")]
    Delivery(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
