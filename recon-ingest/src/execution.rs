//! Exchange-side CSV loading
//!
//! The exchange export is plainer than the clearing one: standard commas,
//! dot decimals, RFC 3339 UTC timestamps, one row per execution with a
//! unique id. Quantity arrives signed (negative for SELL) redundantly with
//! the direction column.

use crate::config::IngestConfig;
use crate::error::Result;
use crate::types::{parse_decimal, ExecutionCsvRow, IngestReport};
use chrono::{DateTime, Utc};
use recon_core::{Direction, ExecutionFill};
use std::collections::HashMap;
use std::io::Read;
use tracing::{info, warn};

/// Reader for the exchange execution CSV export
#[derive(Debug, Clone)]
pub struct ExecutionCsvReader {
    config: IngestConfig,
}

impl ExecutionCsvReader {
    /// Create a reader with the given configuration
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Read and transform an execution export
    ///
    /// Malformed rows are skipped and counted. A duplicate execution id
    /// replaces the earlier row, same as the clearing side.
    pub fn read(&self, source: impl Read) -> Result<(Vec<ExecutionFill>, IngestReport)> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);

        let mut report = IngestReport::default();
        let mut fills: Vec<ExecutionFill> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for (i, result) in reader.deserialize::<ExecutionCsvRow>().enumerate() {
            let line = i + 2;
            report.rows_read += 1;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable execution row at line {}: {}", line, e);
                    report.malformed += 1;
                    continue;
                }
            };

            let fill = match transform_row(&row) {
                Ok(fill) => fill,
                Err(reason) => {
                    warn!("Skipping malformed execution row at line {}: {}", line, reason);
                    report.malformed += 1;
                    continue;
                }
            };

            match by_id.get(&fill.execution_id) {
                Some(&index) => {
                    fills[index] = fill;
                    report.replaced += 1;
                }
                None => {
                    by_id.insert(fill.execution_id.clone(), fills.len());
                    fills.push(fill);
                }
            }

            if report.rows_read % self.config.chunk_size == 0 {
                info!(
                    "Processing chunk {}...",
                    report.rows_read / self.config.chunk_size
                );
            }
        }

        report.loaded = fills.len();
        info!(
            "Execution ingest complete: {} rows read, {} loaded, {} malformed",
            report.rows_read, report.loaded, report.malformed
        );

        Ok((fills, report))
    }
}

fn transform_row(row: &ExecutionCsvRow) -> std::result::Result<ExecutionFill, String> {
    if row.execution_id.trim().is_empty() {
        return Err("missing execution id".to_string());
    }

    let direction = Direction::parse(&row.direction)
        .ok_or_else(|| format!("bad direction '{}'", row.direction))?;

    let quantity =
        parse_decimal(&row.quantity)?.ok_or_else(|| "missing quantity".to_string())?;
    let trade_price =
        parse_decimal(&row.trade_price)?.ok_or_else(|| "missing trade price".to_string())?;

    let trade_date_utc = DateTime::parse_from_rfc3339(row.trade_date_utc.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("bad timestamp '{}'", row.trade_date_utc))?;

    // Sign and direction disagreeing is suspicious but not fatal: matching
    // uses absolute quantity, so load it and let the logs say so.
    let sign_matches = match direction {
        Direction::Buy => !quantity.is_sign_negative(),
        Direction::Sell => quantity.is_sign_negative() || quantity.is_zero(),
    };
    if !sign_matches {
        warn!(
            "Execution {}: quantity {} disagrees with direction {}",
            row.execution_id, quantity, direction
        );
    }

    Ok(ExecutionFill {
        execution_id: row.execution_id.trim().to_string(),
        product: row.product.trim().to_string(),
        trade_type: row.trade_type.trim().to_string(),
        direction,
        quantity,
        trade_price,
        counterparty: row.counterparty.trim().to_string(),
        trade_date_utc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    const CSV_CONTENT: &str = "\
execution_id,product,trade_type,direction,quantity,trade_price,counterparty,trade_date_utc
af12e8,PWR-NORDIC,FUTURES,BUY,5,1.76,STATKRAFT,2025-01-14T09:30:00Z
h1k292,PWR-NORDIC,FUTURES,BUY,8,39.90,STATKRAFT,2025-01-14T11:05:00Z
bb44c1,GAS-UK,FUTURES,SELL,-10,1.16,BP,2025-01-14T10:00:00Z
bb44c2,GAS-UK,FUTURES,SELL,-10,1.16,BP,2025-01-14T10:01:00Z
";

    fn reader() -> ExecutionCsvReader {
        ExecutionCsvReader::new(IngestConfig::default())
    }

    #[test]
    fn test_read_executions() {
        let (fills, report) = reader().read(CSV_CONTENT.as_bytes()).unwrap();
        assert_eq!(report.loaded, 4);
        assert_eq!(report.malformed, 0);

        let af12e8 = &fills[0];
        assert_eq!(af12e8.execution_id, "af12e8");
        assert_eq!(af12e8.quantity, dec!(5));
        assert_eq!(af12e8.trade_price, dec!(1.76));
        assert_eq!(
            af12e8.trade_date_utc,
            Utc.with_ymd_and_hms(2025, 1, 14, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_sell_quantities_stay_signed() {
        let (fills, _) = reader().read(CSV_CONTENT.as_bytes()).unwrap();
        let bb44c1 = fills.iter().find(|f| f.execution_id == "bb44c1").unwrap();
        assert_eq!(bb44c1.quantity, dec!(-10));
        assert_eq!(bb44c1.direction, Direction::Sell);
    }

    #[test]
    fn test_malformed_timestamp_skipped() {
        let csv = "\
execution_id,product,trade_type,direction,quantity,trade_price,counterparty,trade_date_utc
aa0001,GAS-UK,FUTURES,BUY,5,1.16,BP,14/01/2025
aa0002,GAS-UK,FUTURES,BUY,5,1.16,BP,2025-01-14T10:00:00Z
";
        let (fills, report) = reader().read(csv.as_bytes()).unwrap();
        assert_eq!(report.malformed, 1);
        assert_eq!(report.loaded, 1);
        assert_eq!(fills[0].execution_id, "aa0002");
    }

    #[test]
    fn test_duplicate_execution_id_upserts() {
        let csv = "\
execution_id,product,trade_type,direction,quantity,trade_price,counterparty,trade_date_utc
aa0001,GAS-UK,FUTURES,BUY,5,1.16,BP,2025-01-14T10:00:00Z
aa0001,GAS-UK,FUTURES,BUY,7,1.20,BP,2025-01-14T10:00:00Z
";
        let (fills, report) = reader().read(csv.as_bytes()).unwrap();
        assert_eq!(report.replaced, 1);
        assert_eq!(report.loaded, 1);
        assert_eq!(fills[0].quantity, dec!(7));
    }
}
