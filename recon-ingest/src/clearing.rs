//! Clearing-side CSV loading
//!
//! Reads the bank clearing export (semicolon-separated, comma decimals,
//! `dd/mm/YYYY` dates), validates and transforms each row, and upserts on
//! the `(trade_number, fill_sequence)` identity: a later row with the same
//! identity replaces the earlier one, mirroring the staging table's
//! ON CONFLICT DO UPDATE behavior.

use crate::config::IngestConfig;
use crate::error::Result;
use crate::types::{parse_decimal_eu, ClearingCsvRow, IngestReport};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use recon_core::{ClearingFill, Direction};
use std::collections::HashMap;
use std::io::Read;
use tracing::{info, warn};

/// Reader for the bank clearing CSV export
#[derive(Debug, Clone)]
pub struct ClearingCsvReader {
    config: IngestConfig,
}

impl ClearingCsvReader {
    /// Create a reader with the given configuration
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Read and transform a clearing export
    ///
    /// Malformed rows (unparseable date, decimal, or direction; missing
    /// quantity) are skipped and counted; rows missing only a price are
    /// loaded and flagged incomplete.
    pub fn read(&self, source: impl Read) -> Result<(Vec<ClearingFill>, IngestReport)> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(source);

        let mut report = IngestReport::default();
        let mut fills: Vec<ClearingFill> = Vec::new();
        let mut by_identity: HashMap<(String, u32), usize> = HashMap::new();

        for (i, result) in reader.deserialize::<ClearingCsvRow>().enumerate() {
            let line = i + 2; // header is line 1
            report.rows_read += 1;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable clearing row at line {}: {}", line, e);
                    report.malformed += 1;
                    continue;
                }
            };

            let fill = match transform_row(&row, self.config.bank_timezone) {
                Ok(fill) => fill,
                Err(reason) => {
                    warn!("Skipping malformed clearing row at line {}: {}", line, reason);
                    report.malformed += 1;
                    continue;
                }
            };

            if !fill.is_complete {
                warn!(
                    "ALERT: Incomplete trade {}-{} missing price",
                    fill.trade_number, fill.fill_sequence
                );
                report.incomplete += 1;
            }

            let identity = (fill.trade_number.clone(), fill.fill_sequence);
            match by_identity.get(&identity) {
                Some(&index) => {
                    fills[index] = fill;
                    report.replaced += 1;
                }
                None => {
                    by_identity.insert(identity, fills.len());
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
            "Clearing ingest complete: {} rows read, {} loaded, {} incomplete, {} malformed",
            report.rows_read, report.loaded, report.incomplete, report.malformed
        );

        Ok((fills, report))
    }
}

/// Midnight of a local calendar date, converted to UTC
///
/// DST-gap dates fall forward to the earliest valid instant.
pub(crate) fn local_midnight_utc(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn transform_row(row: &ClearingCsvRow, tz: Tz) -> std::result::Result<ClearingFill, String> {
    let trade_date_local = NaiveDate::parse_from_str(row.trade_date_aest.trim(), "%d/%m/%Y")
        .map_err(|_| format!("bad trade date '{}'", row.trade_date_aest))?;

    if row.trade_number.trim().is_empty() {
        return Err("missing trade number".to_string());
    }

    let fill_sequence: u32 = row
        .fill_sequence
        .trim()
        .parse()
        .map_err(|_| format!("bad fill sequence '{}'", row.fill_sequence))?;

    let direction = Direction::parse(&row.direction)
        .ok_or_else(|| format!("bad direction '{}'", row.direction))?;

    let quantity = parse_decimal_eu(&row.quantity)?
        .ok_or_else(|| "missing quantity".to_string())?;
    let price = parse_decimal_eu(&row.price)?;
    let fee = parse_decimal_eu(&row.fee)?;

    Ok(ClearingFill {
        trade_number: row.trade_number.trim().to_string(),
        fill_sequence,
        product: row.product.trim().to_string(),
        market: row.market.trim().to_string(),
        direction,
        quantity,
        price,
        counterparty: row.counterparty.trim().to_string(),
        fee,
        trade_date_local,
        trade_date_utc: local_midnight_utc(trade_date_local, tz),
        is_complete: price.is_some(),
        total_value: price.map(|p| p * quantity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const CSV_CONTENT: &str = "\
trade_date_aest;trade_number;fill_sequence;product;market;direction;quantity;price;counterparty;fee
14/01/2025;T001;1;PWR-NORDIC;EEX;BUY;5;1,76;STATKRAFT;10,02
14/01/2025;T002;1;GAS-UK;EEX;SELL;10;;BP;20,40
15/01/2025;T003;1;EUA;EEX;BUY;4;2,83;SHELL;20,40
";

    fn reader() -> ClearingCsvReader {
        ClearingCsvReader::new(IngestConfig::default())
    }

    #[test]
    fn test_european_parsing() {
        let (fills, report) = reader().read(CSV_CONTENT.as_bytes()).unwrap();
        assert_eq!(report.loaded, 3);

        let t001 = &fills[0];
        assert_eq!(t001.price, Some(dec!(1.76)));
        assert_eq!(t001.fee, Some(dec!(10.02)));
        assert_eq!(t001.quantity, dec!(5));
        assert_eq!(t001.direction, Direction::Buy);
    }

    #[test]
    fn test_incomplete_trade_detection() {
        let (fills, report) = reader().read(CSV_CONTENT.as_bytes()).unwrap();
        assert_eq!(report.incomplete, 1);

        let t002 = fills.iter().find(|f| f.trade_number == "T002").unwrap();
        assert!(!t002.is_complete);
        assert_eq!(t002.price, None);
        assert_eq!(t002.total_value, None);
    }

    #[test]
    fn test_timezone_conversion() {
        // 14 Jan 00:00 Sydney is AEDT (UTC+11) in January: 13 Jan 13:00 UTC
        let (fills, _) = reader().read(CSV_CONTENT.as_bytes()).unwrap();
        let t001 = &fills[0];

        let expected = Utc.with_ymd_and_hms(2025, 1, 13, 13, 0, 0).unwrap();
        assert_eq!(t001.trade_date_utc, Some(expected));
        assert_eq!(
            t001.trade_date_local,
            NaiveDate::from_ymd_opt(2025, 1, 14).unwrap()
        );
    }

    #[test]
    fn test_winter_offset_differs() {
        // 14 June 00:00 Sydney is AEST (UTC+10): 13 June 14:00 UTC
        let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let utc = local_midnight_utc(date, chrono_tz::Australia::Sydney).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2025, 6, 13, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_total_value_calculation() {
        let (fills, _) = reader().read(CSV_CONTENT.as_bytes()).unwrap();
        assert_eq!(fills[0].total_value, Some(dec!(8.80)));
    }

    #[test]
    fn test_malformed_rows_skipped_not_fatal() {
        let csv = "\
trade_date_aest;trade_number;fill_sequence;product;market;direction;quantity;price;counterparty;fee
99/99/2025;T001;1;PWR-NORDIC;EEX;BUY;5;1,76;STATKRAFT;10,02
14/01/2025;T002;1;GAS-UK;EEX;SHORT;10;1,16;BP;20,40
14/01/2025;T003;x;EUA;EEX;BUY;4;2,83;SHELL;20,40
14/01/2025;T004;1;EUA;EEX;BUY;;2,83;SHELL;20,40
14/01/2025;T005;1;EUA;EEX;BUY;4;2,83;SHELL;20,40
";
        let (fills, report) = reader().read(csv.as_bytes()).unwrap();
        assert_eq!(report.rows_read, 5);
        assert_eq!(report.malformed, 4);
        assert_eq!(report.loaded, 1);
        assert_eq!(fills[0].trade_number, "T005");
    }

    #[test]
    fn test_duplicate_identity_upserts_last_wins() {
        let csv = "\
trade_date_aest;trade_number;fill_sequence;product;market;direction;quantity;price;counterparty;fee
14/01/2025;T001;1;PWR-NORDIC;EEX;BUY;5;1,76;STATKRAFT;10,02
14/01/2025;T001;1;PWR-NORDIC;EEX;BUY;6;1,80;STATKRAFT;10,02
14/01/2025;T001;2;PWR-NORDIC;EEX;BUY;8;39,90;STATKRAFT;10,02
";
        let (fills, report) = reader().read(csv.as_bytes()).unwrap();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.replaced, 1);
        assert_eq!(report.loaded, 2);

        assert_eq!(fills[0].quantity, dec!(6));
        assert_eq!(fills[0].price, Some(dec!(1.80)));
        assert_eq!(fills[1].fill_sequence, 2);
    }
}
