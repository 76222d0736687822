//! Required export columns and header resolution.

use csv::StringRecord;
use thiserror::Error;

pub const SYMBOL: &str = "Symbol";
pub const SIDE: &str = "Side";
pub const NAME: &str = "Name";
pub const AVG_PRICE: &str = "Avg Price";
pub const FILLED: &str = "Filled";
pub const FILLED_TIME: &str = "Filled Time";
pub const TOTAL_QTY: &str = "Total Qty";

/// Expected schema for broker fill exports
pub struct FillSchema;

impl FillSchema {
    /// Columns every export must carry, in the order fields are validated.
    pub const REQUIRED: [&'static str; 7] =
        [SYMBOL, SIDE, NAME, AVG_PRICE, FILLED, FILLED_TIME, TOTAL_QTY];

    /// Locate every required column in a header row.
    ///
    /// Header cells are compared after trimming. Extra columns are ignored and
    /// column order is free.
    pub fn resolve(headers: &StringRecord) -> Result<ColumnIndex, SchemaError> {
        let find = |name: &str| -> Result<usize, SchemaError> {
            headers
                .iter()
                .position(|h| clean_header(h) == name)
                .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
        };

        Ok(ColumnIndex {
            symbol: find(SYMBOL)?,
            side: find(SIDE)?,
            name: find(NAME)?,
            avg_price: find(AVG_PRICE)?,
            filled: find(FILLED)?,
            filled_time: find(FILLED_TIME)?,
            total_qty: find(TOTAL_QTY)?,
        })
    }
}

/// Header cell without surrounding whitespace or a leading byte-order mark.
fn clean_header(cell: &str) -> &str {
    cell.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Positions of the required columns within one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub symbol: usize,
    pub side: usize,
    pub name: usize,
    pub avg_price: usize,
    pub filled: usize,
    pub filled_time: usize,
    pub total_qty: usize,
}

impl ColumnIndex {
    /// Highest column position a data row must reach.
    pub fn required_width(&self) -> usize {
        [
            self.symbol,
            self.side,
            self.name,
            self.avg_price,
            self.filled,
            self.filled_time,
            self.total_qty,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

/// Batch-level failure. Any schema error aborts the whole upload before
/// aggregation starts.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("line {line} has {found} fields, required columns need {required}")]
    ShortRow {
        line: u64,
        found: usize,
        required: usize,
    },

    #[error("malformed CSV: {0}")]
    Csv(String),
}

impl From<csv::Error> for SchemaError {
    fn from(e: csv::Error) -> Self {
        SchemaError::Csv(e.to_string())
    }
}
