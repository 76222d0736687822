//! Fill: one canonical execution row from a broker export.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution side of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Parse an export `Side` cell. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        if t.eq_ignore_ascii_case("buy") {
            Some(Side::Buy)
        } else if t.eq_ignore_ascii_case("sell") {
            Some(Side::Sell)
        } else {
            None
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("Buy"),
            Side::Sell => f.write_str("Sell"),
        }
    }
}

/// Option right, derived from the instrument name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Parse an exact `Call` / `Put` label, as written back to the journal.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Call" => Some(OptionType::Call),
            "Put" => Some(OptionType::Put),
            _ => None,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => f.write_str("Call"),
            OptionType::Put => f.write_str("Put"),
        }
    }
}

/// Where a row came from: the source label (usually a file name) and the
/// 1-based line number inside that source, header included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub source: String,
    pub line: u64,
}

impl SourceRef {
    pub fn new(source: impl Into<String>, line: u64) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line)
    }
}

/// A canonical fill: every numeric field parsed, price already scaled to a
/// per-contract cost basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub origin: SourceRef,
    pub symbol: String,
    pub side: Side,
    /// Quantity filled by this row. May be fractional for partial fills.
    pub filled: f64,
    /// Average fill price multiplied by the contract multiplier.
    pub avg_price: f64,
    /// Total order quantity. Drives buy-side quantity accumulation.
    pub total_qty: f64,
    pub filled_time: NaiveDateTime,
    pub trade_date: NaiveDate,
    /// Free-text instrument name, e.g. `AAPL 03/21 150 Call`.
    pub name: String,
    pub strike: String,
    pub option_type: OptionType,
}

impl Fill {
    /// Currency value of this row: filled quantity times scaled price.
    pub fn trade_value(&self) -> f64 {
        self.filled * self.avg_price
    }
}
