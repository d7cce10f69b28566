//! Alert manager
//!
//! Handles alerting for critical reconciliation discrepancies: selects the
//! records worth a human's attention and writes them to the log with enough
//! business context to triage without opening the report.

use recon_core::{ReconStatus, ReconSummary, ReconciliationRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};

/// Default monetary threshold for a discrepancy to count as critical
pub const DEFAULT_ALERT_THRESHOLD: Decimal = dec!(100.00);

/// Selects and logs critical reconciliation discrepancies
#[derive(Debug, Clone)]
pub struct AlertManager {
    threshold: Decimal,
}

impl AlertManager {
    /// Create a manager with the given monetary threshold
    pub fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }

    /// Create a manager from `ALERT_THRESHOLD`, falling back to the default
    pub fn from_env() -> Self {
        let threshold = std::env::var("ALERT_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ALERT_THRESHOLD);
        Self::new(threshold)
    }

    /// The configured threshold
    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Records requiring attention: missing on a side, or an absolute value
    /// difference at or above the threshold
    pub fn critical_alerts<'a>(
        &self,
        records: &'a [ReconciliationRecord],
    ) -> Vec<&'a ReconciliationRecord> {
        records
            .iter()
            .filter(|r| r.status.is_missing() || r.value_diff.abs() >= self.threshold)
            .collect()
    }

    /// Log each critical alert with its business context
    pub fn log_alerts(&self, alerts: &[&ReconciliationRecord]) {
        if alerts.is_empty() {
            info!("No critical alerts - all discrepancies below threshold");
            return;
        }

        warn!("{}", "=".repeat(80));
        warn!("CRITICAL ALERTS: {} items require attention", alerts.len());
        warn!("{}", "=".repeat(80));

        for record in alerts {
            warn!(
                "Contract: {} | Counterparty: {} | {} {}",
                record.key.product, record.key.counterparty, record.key.trade_date, record.key.direction
            );
            warn!("Status:   {}", record.status);
            warn!("Diff:     ${}", record.value_diff.abs());
            self.log_business_context(record);
            warn!("{}", "-".repeat(80));
        }
    }

    fn log_business_context(&self, record: &ReconciliationRecord) {
        match record.status {
            ReconStatus::MissingInBank => {
                warn!("RISK: Revenue leakage - trade exists but no bank record.");
            }
            ReconStatus::MissingInExchange => {
                warn!("RISK: Overpayment - bank record exists without matching trade.");
            }
            ReconStatus::QtyMismatch => {
                warn!(
                    "QTY MISMATCH: {} contracts unaccounted for",
                    record.quantity_diff.abs()
                );
            }
            ReconStatus::ValueMismatch => {
                warn!("VALUE MISMATCH: Financial gap of ${}", record.value_diff.abs());
            }
            ReconStatus::Matched => {}
        }
    }

    /// Log the run summary table
    pub fn log_summary(&self, summary: &ReconSummary) {
        info!("{}", "=".repeat(80));
        info!("RECONCILIATION SUMMARY");
        info!("{}", "=".repeat(80));
        info!("{:<25}: {}", "Total Keys", summary.total_keys);
        info!("{:<25}: {}", "Matched", summary.matched);
        info!("{:<25}: {}", "Qty Mismatches", summary.qty_mismatches);
        info!("{:<25}: {}", "Value Mismatches", summary.value_mismatches);
        info!("{:<25}: {}", "Missing In Bank", summary.missing_in_bank);
        info!("{:<25}: {}", "Missing In Exchange", summary.missing_in_exchange);
        info!("{:<25}: {}", "Critical Alerts", summary.critical_alerts);
        info!(
            "{:<25}: ${}",
            "Total Discrepancy", summary.total_discrepancy_amount
        );
        info!("{}", "=".repeat(80));
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_THRESHOLD)
    }
}
