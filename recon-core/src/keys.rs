//! Business-key derivation
//!
//! The business key (product, counterparty, trade date, direction) is the
//! only bridge between the two ledgers, and the trade-date component is its
//! most sensitive part: an off-by-one day is silently undetectable except as
//! a spurious mismatch. The bank side already records a local calendar date;
//! the exchange side records a full UTC timestamp, and which calendar day
//! that timestamp belongs to is a genuine source ambiguity. [`DayBasis`]
//! makes that choice an explicit, tested parameter instead of an implicit
//! truncation.

use crate::error::{Error, Result};
use crate::types::{BusinessKey, ClearingFill, ExecutionFill, Side};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for assigning an exchange execution timestamp to a business day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "basis", content = "zone")]
pub enum DayBasis {
    /// Truncate the UTC timestamp to its UTC date component
    Utc,
    /// Take the calendar day in the given IANA time zone
    Zone(Tz),
}

impl Default for DayBasis {
    fn default() -> Self {
        DayBasis::Utc
    }
}

impl DayBasis {
    /// Business day of a UTC timestamp under this policy
    pub fn business_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        match self {
            DayBasis::Utc => ts.date_naive(),
            DayBasis::Zone(tz) => ts.with_timezone(tz).date_naive(),
        }
    }

    /// Parse from a config string: `"utc"` or an IANA zone name
    pub fn parse(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("utc") {
            return Ok(DayBasis::Utc);
        }
        s.trim()
            .parse::<Tz>()
            .map(DayBasis::Zone)
            .map_err(|_| Error::Config(format!("unknown day basis '{}'", s)))
    }
}

fn require<'a>(value: &'a str, component: &'static str, side: Side, source_ref: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidKeyComponent {
            side,
            source_ref: source_ref.to_string(),
            component,
        });
    }
    Ok(trimmed)
}

/// Derive the business key of a clearing fill
///
/// The trade date is the bank's local calendar date as recorded.
pub fn clearing_key(fill: &ClearingFill) -> Result<BusinessKey> {
    let source_ref = fill.source_ref();
    Ok(BusinessKey {
        product: require(&fill.product, "product", Side::Bank, &source_ref)?.to_string(),
        counterparty: require(&fill.counterparty, "counterparty", Side::Bank, &source_ref)?
            .to_string(),
        trade_date: fill.trade_date_local,
        direction: fill.direction,
    })
}

/// Derive the business key of an exchange execution under a day basis
pub fn execution_key(fill: &ExecutionFill, basis: DayBasis) -> Result<BusinessKey> {
    Ok(BusinessKey {
        product: require(&fill.product, "product", Side::Exchange, &fill.execution_id)?
            .to_string(),
        counterparty: require(
            &fill.counterparty,
            "counterparty",
            Side::Exchange,
            &fill.execution_id,
        )?
        .to_string(),
        trade_date: basis.business_date(fill.trade_date_utc),
        direction: fill.direction,
    })
}
