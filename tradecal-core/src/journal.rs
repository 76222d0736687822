//! Trade journal: the plain-text record format plus the note sink/source
//! traits that stores implement.
//!
//! One record per save, fields in a fixed order, each record closed by a
//! line of 40 dashes. `Notes` is last and may span several lines.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{OptionType, Side, TradeSummary};

/// Line closing every record.
pub const SEPARATOR: &str = "----------------------------------------";

/// What readers see when no journal exists yet.
pub const PLACEHOLDER: &str = "No journal entries found.";

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid journal record: {0}")]
    InvalidRecord(String),
}

/// A saved note about one trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: NaiveDate,
    pub symbol: String,
    pub action: Side,
    pub avg_buy_price: f64,
    pub avg_sell_price: f64,
    pub quantity: f64,
    pub pnl: f64,
    pub strike: String,
    pub option_type: OptionType,
    pub notes: String,
}

impl JournalEntry {
    pub fn from_summary(date: NaiveDate, trade: &TradeSummary, notes: impl Into<String>) -> Self {
        Self {
            date,
            symbol: trade.symbol.clone(),
            action: trade.action,
            avg_buy_price: trade.avg_buy_price,
            avg_sell_price: trade.avg_sell_price,
            quantity: trade.quantity,
            pnl: trade.pnl,
            strike: trade.strike.clone(),
            option_type: trade.option_type,
            notes: notes.into(),
        }
    }
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Date: {}", self.date.format("%Y-%m-%d"))?;
        writeln!(f, "Symbol: {}", self.symbol)?;
        writeln!(f, "Action: {}", self.action)?;
        writeln!(f, "Avg Buy Price: ${:.2}", self.avg_buy_price)?;
        writeln!(f, "Avg Sell Price: ${:.2}", self.avg_sell_price)?;
        writeln!(f, "Quantity: {}", format_quantity(self.quantity))?;
        writeln!(f, "P&L: ${:.2}", self.pnl)?;
        writeln!(f, "Strike: {}", self.strike)?;
        writeln!(f, "Type: {}", self.option_type)?;
        writeln!(f, "Notes: {}", self.notes)?;
        writeln!(f, "{SEPARATOR}")
    }
}

/// The exact text appended for one entry, trailing newline included.
pub fn format_entry(entry: &JournalEntry) -> String {
    entry.to_string()
}

/// Whole quantities print without a decimal point.
pub fn format_quantity(quantity: f64) -> String {
    if quantity.is_finite() && quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        format!("{quantity}")
    }
}

/// Somewhere entries can be appended to.
pub trait NoteSink {
    fn append(&mut self, entry: &JournalEntry) -> Result<(), JournalError>;
}

/// Somewhere the full journal text can be read back from.
pub trait NoteSource {
    /// Full journal text, or [`PLACEHOLDER`] when nothing has been saved.
    fn read_all(&self) -> Result<String, JournalError>;
}

/// In-memory journal.
#[derive(Debug, Clone, Default)]
pub struct MemoryJournal {
    text: String,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        parse_journal(&self.text)
    }
}

impl NoteSink for MemoryJournal {
    fn append(&mut self, entry: &JournalEntry) -> Result<(), JournalError> {
        self.text.push_str(&format_entry(entry));
        Ok(())
    }
}

impl NoteSource for MemoryJournal {
    fn read_all(&self) -> Result<String, JournalError> {
        if self.text.is_empty() {
            Ok(PLACEHOLDER.to_string())
        } else {
            Ok(self.text.clone())
        }
    }
}

/// Parse journal text back into entries, in file order.
///
/// Blocks that don't hold a complete record are skipped with a warning;
/// so is any text before a block's `Date:` line.
pub fn parse_journal(text: &str) -> Vec<JournalEntry> {
    let mut entries = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim_end() == SEPARATOR {
            push_block(&block, &mut entries);
            block.clear();
        } else {
            block.push(line);
        }
    }
    push_block(&block, &mut entries);

    entries
}

fn push_block(block: &[&str], entries: &mut Vec<JournalEntry>) {
    if block.iter().all(|l| l.trim().is_empty()) {
        return;
    }
    match parse_record(block) {
        Ok(entry) => entries.push(entry),
        Err(e) => tracing::warn!("skipping journal block: {e}"),
    }
}

/// Parse one record's lines (separator excluded).
pub fn parse_record(lines: &[&str]) -> Result<JournalEntry, JournalError> {
    let start = lines
        .iter()
        .position(|l| l.starts_with("Date:"))
        .ok_or_else(|| JournalError::InvalidRecord("missing Date line".into()))?;
    let mut fields = FieldReader {
        lines: &lines[start..],
        pos: 0,
    };

    let date_raw = fields.take("Date")?;
    let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
        .map_err(|_| invalid("Date", date_raw))?;
    let symbol = fields.take("Symbol")?.to_string();
    let action_raw = fields.take("Action")?;
    let action = Side::parse(action_raw).ok_or_else(|| invalid("Action", action_raw))?;
    let avg_buy_price = fields.money("Avg Buy Price")?;
    let avg_sell_price = fields.money("Avg Sell Price")?;
    let qty_raw = fields.take("Quantity")?;
    let quantity: f64 = qty_raw.parse().map_err(|_| invalid("Quantity", qty_raw))?;
    let pnl = fields.money("P&L")?;
    let strike = fields.take("Strike")?.to_string();
    let type_raw = fields.take("Type")?;
    let option_type = OptionType::parse(type_raw).ok_or_else(|| invalid("Type", type_raw))?;
    let first_note = fields.take("Notes")?;

    let mut notes = first_note.to_string();
    for extra in fields.rest() {
        notes.push('\n');
        notes.push_str(extra);
    }
    let notes = notes.trim_end().to_string();

    Ok(JournalEntry {
        date,
        symbol,
        action,
        avg_buy_price,
        avg_sell_price,
        quantity,
        pnl,
        strike,
        option_type,
        notes,
    })
}

fn invalid(field: &str, value: &str) -> JournalError {
    JournalError::InvalidRecord(format!("bad {field} value {value:?}"))
}

struct FieldReader<'a> {
    lines: &'a [&'a str],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    fn take(&mut self, label: &str) -> Result<&'a str, JournalError> {
        let lines = self.lines;
        let line: &'a str = lines
            .get(self.pos)
            .copied()
            .ok_or_else(|| JournalError::InvalidRecord(format!("missing {label} line")))?;
        let value = line
            .strip_prefix(label)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| {
                JournalError::InvalidRecord(format!("expected {label}, found {line:?}"))
            })?;
        self.pos += 1;
        Ok(value.strip_prefix(' ').unwrap_or(value))
    }

    fn money(&mut self, label: &str) -> Result<f64, JournalError> {
        let raw = self.take(label)?;
        raw.trim()
            .strip_prefix('$')
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| invalid(label, raw))
    }

    fn rest(&self) -> &'a [&'a str] {
        &self.lines[self.pos.min(self.lines.len())..]
    }
}
