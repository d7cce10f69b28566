//! Reconciliation service
//!
//! Plumbing around the pure core: process orchestration (the batch pipeline
//! binary `recon-run`) and the serving endpoint (the HTTP binary
//! `recon-server`). Both wire the same stages together:
//!
//! ```text
//! CSV exports -> ingest -> staging snapshot -> aggregate x2 -> reconcile
//!             -> summary + alerts (+ email) -> report / HTTP response
//! ```
//!
//! The service distinguishes "no data for the requested window" (an empty
//! but valid reconciliation) from "ingestion failed" (a loud error); an
//! empty result must never paper over a broken load.

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod pipeline;

// Re-exports
pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use pipeline::{run_window, ReconRun};
