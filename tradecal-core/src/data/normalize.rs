//! Row Normalizer: raw export cells to canonical fills.
//!
//! Each field is coerced independently into a typed value. A field that
//! cannot be coerced turns the whole row into a [`RowError`]; nothing is
//! ever defaulted to zero or NaN and carried into the sums.

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

use super::schema::{self, ColumnIndex};
use crate::domain::{Diagnostic, DiagnosticKind, Fill, OptionType, RowError, Side, SourceRef};

/// Timestamp layouts accepted for `Filled Time`, tried in order.
const DATETIME_FORMATS: [&str; 5] = [
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts, read as midnight.
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// Knobs for field coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Scales a per-share option premium to a per-contract cost basis.
    pub price_multiplier: f64,
    /// Trailing timezone tokens stripped from `Filled Time` before parsing.
    pub timezone_suffixes: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            price_multiplier: 100.0,
            timezone_suffixes: vec!["EDT".to_string()],
        }
    }
}

/// Outcome of option-type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub option_type: OptionType,
    /// False when the name mentions neither `Call` nor `Put` and the
    /// `Put` fallback was applied.
    pub explicit: bool,
}

/// Classify an instrument name: `Call` anywhere wins, then `Put`, and
/// anything else falls back to `Put`.
pub fn classify_option_type(name: &str) -> Classified {
    if name.contains("Call") {
        Classified {
            option_type: OptionType::Call,
            explicit: true,
        }
    } else {
        Classified {
            option_type: OptionType::Put,
            explicit: name.contains("Put"),
        }
    }
}

/// Third whitespace-delimited token of the instrument name.
pub fn extract_strike(name: &str) -> Result<String, RowError> {
    name.split_whitespace()
        .nth(2)
        .map(str::to_string)
        .ok_or_else(|| RowError::InstrumentFormat {
            name: name.to_string(),
        })
}

/// Parse `Avg Price`: optional leading `@`, then a decimal, then scaled.
pub fn parse_avg_price(raw: &str, multiplier: f64) -> Option<f64> {
    let t = raw.trim();
    let t = t.strip_prefix('@').unwrap_or(t).trim();
    parse_finite(t).map(|p| p * multiplier)
}

/// Parse a non-negative quantity (`Filled`, `Total Qty`).
pub fn parse_quantity(raw: &str) -> Option<f64> {
    parse_finite(raw.trim()).filter(|q| *q >= 0.0)
}

/// Parse `Filled Time`, dropping one configured trailing timezone token.
pub fn parse_filled_time(raw: &str, timezone_suffixes: &[String]) -> Option<NaiveDateTime> {
    let mut t = raw.trim();
    for suffix in timezone_suffixes {
        if let Some(rest) = t.strip_suffix(suffix.as_str()) {
            if rest.ends_with(char::is_whitespace) {
                t = rest.trim_end();
                break;
            }
        }
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(t, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(t, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_finite(t: &str) -> Option<f64> {
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A successfully normalized row plus any warnings it raised.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub fill: Fill,
    pub warnings: Vec<Diagnostic>,
}

/// Stateless row converter. One instance serves a whole batch.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Convert one data row. The caller guarantees the record is at least
    /// `columns.required_width()` wide.
    ///
    /// On failure the returned diagnostic carries the symbol when one could
    /// be read, so excluded rows can still be attributed.
    pub fn normalize(
        &self,
        record: &StringRecord,
        columns: &ColumnIndex,
        origin: SourceRef,
    ) -> Result<NormalizedRow, Diagnostic> {
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let symbol = cell(columns.symbol).trim();
        let symbol_hint = (!symbol.is_empty()).then(|| symbol.to_string());
        let reject =
            |err: RowError| Diagnostic::excluded(origin.clone(), symbol_hint.clone(), err);

        if symbol.is_empty() {
            return Err(reject(RowError::field(schema::SYMBOL, symbol)));
        }

        let raw_side = cell(columns.side);
        let side = Side::parse(raw_side)
            .ok_or_else(|| reject(RowError::field(schema::SIDE, raw_side)))?;

        let name = cell(columns.name).trim();
        let strike = extract_strike(name).map_err(&reject)?;

        let raw_price = cell(columns.avg_price);
        let avg_price = parse_avg_price(raw_price, self.options.price_multiplier)
            .ok_or_else(|| reject(RowError::field(schema::AVG_PRICE, raw_price)))?;

        let raw_filled = cell(columns.filled);
        let filled = parse_quantity(raw_filled)
            .ok_or_else(|| reject(RowError::field(schema::FILLED, raw_filled)))?;

        let raw_time = cell(columns.filled_time);
        let filled_time = parse_filled_time(raw_time, &self.options.timezone_suffixes)
            .ok_or_else(|| reject(RowError::field(schema::FILLED_TIME, raw_time)))?;

        let raw_total = cell(columns.total_qty);
        let total_qty = parse_quantity(raw_total)
            .ok_or_else(|| reject(RowError::field(schema::TOTAL_QTY, raw_total)))?;

        let classified = classify_option_type(name);
        let mut warnings = Vec::new();
        if !classified.explicit {
            warnings.push(Diagnostic {
                origin: origin.clone(),
                symbol: Some(symbol.to_string()),
                kind: DiagnosticKind::UnclassifiedOptionType {
                    name: name.to_string(),
                },
            });
        }

        Ok(NormalizedRow {
            fill: Fill {
                origin,
                symbol: symbol.to_string(),
                side,
                filled,
                avg_price,
                total_qty,
                filled_time,
                trade_date: filled_time.date(),
                name: name.to_string(),
                strike,
                option_type: classified.option_type,
            },
            warnings,
        })
    }
}
