//! Alerting and reporting for reconciliation runs
//!
//! Consumes classified [`ReconciliationRecord`](recon_core::ReconciliationRecord)s
//! and turns them into things humans act on:
//!
//! - console alerts for critical discrepancies, with business context
//!   (revenue leakage vs. overpayment risk)
//! - a run summary table
//! - rendered email notifications, delivered through a pluggable transport
//! - tabular report files (CSV/JSON), one row per record

pub mod email;
pub mod error;
pub mod manager;
pub mod report;

// Re-exports
pub use email::{
    render_alert_email, send_email_alerts, AlertTransport, EmailConfig, EmailMessage,
    FileTransport,
};
pub use error::{AlertError, Result};
pub use manager::AlertManager;
pub use report::{ReportFormat, ReportWriter};
