//! Error types for the reconciliation core

use crate::types::Side;
use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciliation core errors
///
/// The taxonomy is narrow: the join/classify stage is total over its input
/// types and cannot fail. Key derivation is the only fallible step, and a
/// failure there rejects the single fill, never the run.
#[derive(Error, Debug)]
pub enum Error {
    /// A fill's key component is absent and no default exists
    #[error("{side} fill {source_ref}: missing key component '{component}'")]
    InvalidKeyComponent {
        /// Which ledger the fill came from
        side: Side,
        /// Source reference of the offending fill
        source_ref: String,
        /// The missing component
        component: &'static str,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error (config loading)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
