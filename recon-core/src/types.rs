//! Core types for trade reconciliation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Buy side
    Buy,
    /// Sell side
    Sell,
}

impl Direction {
    /// Parse from a source-system string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(Direction::Buy),
            "SELL" => Some(Direction::Sell),
            _ => None,
        }
    }

    /// Get as the canonical upper-case string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which ledger a fill or summary belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bank/clearing ledger
    Bank,
    /// Exchange ledger
    Exchange,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Bank => write!(f, "bank"),
            Side::Exchange => write!(f, "exchange"),
        }
    }
}

/// One settlement line from the bank clearing system
///
/// A trade may clear as multiple fills; the pair
/// `(trade_number, fill_sequence)` identifies one line. Read-only input to
/// the core: created by ingestion, never updated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearingFill {
    /// Trade number assigned by the clearing system
    pub trade_number: String,

    /// Fill sequence within the trade (1-based)
    pub fill_sequence: u32,

    /// Product code (e.g. PWR-NORDIC)
    pub product: String,

    /// Market/venue code
    pub market: String,

    /// Trade direction
    pub direction: Direction,

    /// Quantity as recorded by the clearing system
    pub quantity: Decimal,

    /// Price; absent on incomplete fills
    pub price: Option<Decimal>,

    /// Counterparty name
    pub counterparty: String,

    /// Clearing fee
    pub fee: Option<Decimal>,

    /// Calendar date in the bank's reporting time zone
    pub trade_date_local: NaiveDate,

    /// UTC equivalent of the local trade date (midnight local, converted)
    pub trade_date_utc: Option<DateTime<Utc>>,

    /// False when price or quantity was missing at ingestion
    pub is_complete: bool,

    /// Upstream-computed price x quantity; the core sums it, never recomputes
    pub total_value: Option<Decimal>,
}

impl ClearingFill {
    /// Human-readable source reference: "trade_number-fill_sequence"
    pub fn source_ref(&self) -> String {
        format!("{}-{}", self.trade_number, self.fill_sequence)
    }
}

/// One partial or full execution from the exchange
///
/// Quantity is signed: negative for SELL, positive for BUY, redundantly with
/// the separate direction field. Read-only input to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionFill {
    /// Unique execution id assigned by the exchange
    pub execution_id: String,

    /// Product code
    pub product: String,

    /// Exchange trade type (e.g. FUTURES)
    pub trade_type: String,

    /// Trade direction
    pub direction: Direction,

    /// Signed quantity (negative for SELL)
    pub quantity: Decimal,

    /// Execution price
    pub trade_price: Decimal,

    /// Counterparty name
    pub counterparty: String,

    /// Full execution timestamp, UTC
    pub trade_date_utc: DateTime<Utc>,
}

/// Grouping key used to compare trades across systems lacking a shared
/// identifier
///
/// `trade_date` is always a calendar date: taken from `trade_date_local` on
/// the bank side and derived from the execution timestamp under a
/// [`DayBasis`](crate::keys::DayBasis) policy on the exchange side. `Ord` is
/// derived so reconciliation output has a stable, testable order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusinessKey {
    /// Product code
    pub product: String,

    /// Counterparty name
    pub counterparty: String,

    /// Business calendar date
    pub trade_date: NaiveDate,

    /// Trade direction
    pub direction: Direction,
}

impl std::fmt::Display for BusinessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.product, self.counterparty, self.trade_date, self.direction
        )
    }
}

/// Aggregation of all fills sharing a business key on one side
///
/// Doubles as the per-key accumulator: it is built up one fill at a time and
/// two partial summaries for the same key can be [`merge`](Self::merge)d,
/// which is what makes sharded aggregation safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    /// Business key this summary aggregates
    pub key: BusinessKey,

    /// Quantity total (signed sum on the bank side, absolute sum on the
    /// exchange side)
    pub quantity: Decimal,

    /// Monetary value total; `None` when no fill contributed a value.
    /// Coalesced to zero at output time only.
    pub value: Option<Decimal>,

    /// Number of fills aggregated
    pub fill_count: usize,

    /// Source references in first-seen order
    pub source_refs: Vec<String>,
}

impl SideSummary {
    /// Create an empty summary for a key
    pub fn new(key: BusinessKey) -> Self {
        Self {
            key,
            quantity: Decimal::ZERO,
            value: None,
            fill_count: 0,
            source_refs: Vec::new(),
        }
    }

    /// Fold one fill's contribution into the summary
    ///
    /// A `None` value contributes nothing to the value total; it is not
    /// coerced to zero, so a summary built only from value-less fills stays
    /// value-`None`.
    pub fn record(&mut self, quantity: Decimal, value: Option<Decimal>, source_ref: String) {
        self.quantity += quantity;
        if let Some(v) = value {
            self.value = Some(self.value.unwrap_or(Decimal::ZERO) + v);
        }
        self.fill_count += 1;
        self.source_refs.push(source_ref);
    }

    /// Merge another partial summary for the same key into this one
    ///
    /// Associative and commutative in quantity, value, and count; source refs
    /// concatenate in argument order.
    pub fn merge(&mut self, other: SideSummary) {
        debug_assert_eq!(self.key, other.key);
        self.quantity += other.quantity;
        self.value = match (self.value, other.value) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(Decimal::ZERO) + b.unwrap_or(Decimal::ZERO)),
        };
        self.fill_count += other.fill_count;
        self.source_refs.extend(other.source_refs);
    }

    /// Comma-joined source references, first-seen order
    pub fn joined_refs(&self) -> String {
        self.source_refs.join(",")
    }
}

/// A fill the aggregator refused to group because a key component was absent
///
/// The system would rather under-report than mis-match, so such fills are
/// surfaced instead of being grouped under a synthetic key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedFill {
    /// Which ledger the fill came from
    pub side: Side,

    /// Source reference of the rejected fill
    pub source_ref: String,

    /// Missing key component
    pub component: &'static str,
}

/// Classification of one business key across both ledgers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconStatus {
    /// Key absent from the bank mapping
    #[serde(rename = "MISSING IN BANK")]
    MissingInBank,

    /// Key absent from the exchange mapping
    #[serde(rename = "MISSING IN EXCHANGE")]
    MissingInExchange,

    /// Quantity difference beyond tolerance
    #[serde(rename = "QTY MISMATCH")]
    QtyMismatch,

    /// Value difference beyond tolerance
    #[serde(rename = "VALUE MISMATCH")]
    ValueMismatch,

    /// Both sides agree within tolerance
    #[serde(rename = "MATCHED")]
    Matched,
}

impl ReconStatus {
    /// Get as the report string
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconStatus::MissingInBank => "MISSING IN BANK",
            ReconStatus::MissingInExchange => "MISSING IN EXCHANGE",
            ReconStatus::QtyMismatch => "QTY MISMATCH",
            ReconStatus::ValueMismatch => "VALUE MISMATCH",
            ReconStatus::Matched => "MATCHED",
        }
    }

    /// Parse from the report string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MISSING IN BANK" => Some(ReconStatus::MissingInBank),
            "MISSING IN EXCHANGE" => Some(ReconStatus::MissingInExchange),
            "QTY MISMATCH" => Some(ReconStatus::QtyMismatch),
            "VALUE MISMATCH" => Some(ReconStatus::ValueMismatch),
            "MATCHED" => Some(ReconStatus::Matched),
            _ => None,
        }
    }

    /// True for either missing-side status
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            ReconStatus::MissingInBank | ReconStatus::MissingInExchange
        )
    }
}

impl std::fmt::Display for ReconStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of reconciliation output, per business key observed on either side
///
/// A pure function of the two side summaries for its key; quantities and
/// values for a missing side are zero here (and only here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationRecord {
    /// Business key
    pub key: BusinessKey,

    /// Bank-side quantity total (zero if the key is missing in bank)
    pub bank_quantity: Decimal,

    /// Exchange-side quantity total (zero if missing in exchange)
    pub exchange_quantity: Decimal,

    /// bank_quantity - exchange_quantity
    pub quantity_diff: Decimal,

    /// Bank-side value total, coalesced to zero
    pub bank_value: Decimal,

    /// Exchange-side value total, coalesced to zero
    pub exchange_value: Decimal,

    /// bank_value - exchange_value
    pub value_diff: Decimal,

    /// Comma-joined bank source references
    pub bank_refs: String,

    /// Comma-joined exchange source references
    pub exchange_refs: String,

    /// Discrepancy classification
    pub status: ReconStatus,
}

/// Statistics over one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconSummary {
    /// Business keys observed on either side
    pub total_keys: usize,

    /// Keys classified MATCHED
    pub matched: usize,

    /// Keys classified QTY MISMATCH
    pub qty_mismatches: usize,

    /// Keys classified VALUE MISMATCH
    pub value_mismatches: usize,

    /// Keys classified MISSING IN BANK
    pub missing_in_bank: usize,

    /// Keys classified MISSING IN EXCHANGE
    pub missing_in_exchange: usize,

    /// Records at or above the alert threshold, or missing on a side
    pub critical_alerts: usize,

    /// Sum of absolute value differences
    pub total_discrepancy_amount: Decimal,
}
