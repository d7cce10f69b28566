//! Raw row shapes and ingestion reporting

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One raw clearing row, exactly as the bank CSV delivers it
///
/// Everything arrives as text (European number format, `dd/mm/YYYY` dates);
/// transformation into a typed [`ClearingFill`](recon_core::ClearingFill)
/// happens in [`crate::clearing`].
#[derive(Debug, Clone, Deserialize)]
pub struct ClearingCsvRow {
    /// Trade date in the bank's reporting zone, `dd/mm/YYYY`
    pub trade_date_aest: String,
    /// Trade number
    pub trade_number: String,
    /// Fill sequence
    pub fill_sequence: String,
    /// Product code
    pub product: String,
    /// Market/venue code
    pub market: String,
    /// Direction string (`BUY`/`SELL`)
    pub direction: String,
    /// Quantity, comma-decimal
    pub quantity: String,
    /// Price, comma-decimal, may be empty
    pub price: String,
    /// Counterparty
    pub counterparty: String,
    /// Fee, comma-decimal, may be empty
    pub fee: String,
}

/// One raw exchange execution row
///
/// The exchange export is standard CSV: dot decimals, RFC 3339 timestamps.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionCsvRow {
    /// Unique execution id
    pub execution_id: String,
    /// Product code
    pub product: String,
    /// Exchange trade type
    pub trade_type: String,
    /// Direction string (`BUY`/`SELL`)
    pub direction: String,
    /// Signed quantity (negative for SELL)
    pub quantity: String,
    /// Execution price
    pub trade_price: String,
    /// Counterparty
    pub counterparty: String,
    /// Execution timestamp, RFC 3339 UTC
    pub trade_date_utc: String,
}

/// Outcome of one CSV load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Rows read from the source
    pub rows_read: usize,

    /// Fills handed to the staging store
    pub loaded: usize,

    /// Loaded fills missing a price (flagged, not dropped)
    pub incomplete: usize,

    /// Rows skipped because a field would not parse
    pub malformed: usize,

    /// Rows that replaced an earlier row with the same identity
    pub replaced: usize,
}

/// Parse a European-format decimal (`1,76` → 1.76); empty means absent
pub(crate) fn parse_decimal_eu(raw: &str) -> Result<Option<Decimal>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(&trimmed.replace(',', "."))
        .map(Some)
        .map_err(|_| format!("bad decimal '{}'", raw))
}

/// Parse a standard dot-decimal; empty means absent
pub(crate) fn parse_decimal(raw: &str) -> Result<Option<Decimal>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(trimmed).map(Some).map_err(|_| format!("bad decimal '{}'", raw))
}
