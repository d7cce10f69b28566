//! Report export
//!
//! Serializes reconciliation records as a flat table, one row per business
//! key, decimals as plain numbers, status as its report string, for the
//! humans who review discrepancies somewhere other than a terminal.

use crate::error::{AlertError, Result};
use chrono::Utc;
use recon_core::ReconciliationRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Comma-separated values
    Csv,
    /// Pretty-printed JSON
    Json,
}

impl ReportFormat {
    /// File extension for the format
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

/// Writes reconciliation reports to an output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Create a writer, creating the output directory if needed
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Write a report named after the window label and generation time
    pub fn write(
        &self,
        records: &[ReconciliationRecord],
        window_label: &str,
        format: ReportFormat,
    ) -> Result<PathBuf> {
        let filename = format!(
            "reconciliation_{}_{}.{}",
            window_label,
            Utc::now().format("%Y%m%d_%H%M%S"),
            format.extension()
        );
        let path = self.output_dir.join(filename);
        self.write_to(records, &path, format)?;
        Ok(path)
    }

    /// Write a report to an explicit path
    pub fn write_to(
        &self,
        records: &[ReconciliationRecord],
        path: &Path,
        format: ReportFormat,
    ) -> Result<()> {
        match format {
            ReportFormat::Csv => write_csv(records, path)?,
            ReportFormat::Json => {
                let json = serde_json::to_string_pretty(records)
                    .map_err(|e| AlertError::Serialization(e.to_string()))?;
                std::fs::write(path, json)?;
            }
        }
        info!("Wrote {} reconciliation records to {}", records.len(), path.display());
        Ok(())
    }
}

/// Flat row shape for tabular export
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    product: &'a str,
    counterparty: &'a str,
    trade_date: String,
    direction: &'a str,
    bank_quantity: String,
    exchange_quantity: String,
    quantity_diff: String,
    bank_value: String,
    exchange_value: String,
    value_diff: String,
    bank_refs: &'a str,
    exchange_refs: &'a str,
    status: &'a str,
}

impl<'a> From<&'a ReconciliationRecord> for ReportRow<'a> {
    fn from(record: &'a ReconciliationRecord) -> Self {
        Self {
            product: &record.key.product,
            counterparty: &record.key.counterparty,
            trade_date: record.key.trade_date.to_string(),
            direction: record.key.direction.as_str(),
            bank_quantity: record.bank_quantity.to_string(),
            exchange_quantity: record.exchange_quantity.to_string(),
            quantity_diff: record.quantity_diff.to_string(),
            bank_value: record.bank_value.to_string(),
            exchange_value: record.exchange_value.to_string(),
            value_diff: record.value_diff.to_string(),
            bank_refs: &record.bank_refs,
            exchange_refs: &record.exchange_refs,
            status: record.status.as_str(),
        }
    }
}

fn write_csv(records: &[ReconciliationRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(ReportRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}
