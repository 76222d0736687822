//! Report runner: wires together loading, aggregation and the journal.
//!
//! Two entry points:
//! - `run_report()`: loads exports from disk, then aggregates. Used by every CLI command.
//! - `save_note()`: looks a trade up in a report and appends a journal entry for it.
//!
//! A lookup must resolve to exactly one summary. Under contract grouping a
//! bare symbol can match several; the caller then narrows the
//! [`TradeQuery`] by strike or option type.

use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use tradecal_core::domain::{TradeQuery, TradeSummary};
use tradecal_core::engine::BatchReport;
use tradecal_core::journal::{JournalEntry, JournalError, NoteSink};

use crate::config::AppConfig;
use crate::loader::{load_batch, LoadError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("data error: {0}")]
    Load(#[from] LoadError),
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),
    #[error("no trade for {query} on {date}")]
    TradeNotFound { date: NaiveDate, query: TradeQuery },
    #[error("{count} trades match {query} on {date}; narrow by strike or option type")]
    AmbiguousTrade {
        date: NaiveDate,
        query: TradeQuery,
        count: usize,
    },
}

/// Load `paths` and aggregate them under `config`.
pub fn run_report<P: AsRef<Path>>(config: &AppConfig, paths: &[P]) -> Result<BatchReport, RunError> {
    let (batch, fingerprint) = load_batch(paths, &config.import.normalize_options())?.into_parts();
    let report =
        BatchReport::with_fingerprint(batch, fingerprint, &config.import.aggregate_options());

    info!(
        files = paths.len(),
        rows = report.rows_read,
        fills = report.fill_count,
        excluded = report.excluded_count(),
        trading_days = report.aggregation.trading_days(),
        total_pnl = report.aggregation.total_pnl(),
        fingerprint = %report.fingerprint,
        "report built"
    );
    Ok(report)
}

/// The single summary `query` selects on `date`.
pub fn find_trade<'a>(
    report: &'a BatchReport,
    date: NaiveDate,
    query: &TradeQuery,
) -> Result<&'a TradeSummary, RunError> {
    let mut hits = report
        .aggregation
        .trade_details
        .get(&date)
        .into_iter()
        .flatten()
        .filter(|t| query.matches(t));

    let not_found = || RunError::TradeNotFound {
        date,
        query: query.clone(),
    };
    let trade = hits.next().ok_or_else(not_found)?;
    let extra = hits.count();
    if extra > 0 {
        return Err(RunError::AmbiguousTrade {
            date,
            query: query.clone(),
            count: extra + 1,
        });
    }
    Ok(trade)
}

/// Append a note for an existing trade to `sink`. Nothing is written unless
/// `query` resolves to exactly one trade.
pub fn save_note(
    report: &BatchReport,
    sink: &mut dyn NoteSink,
    date: NaiveDate,
    query: &TradeQuery,
    notes: &str,
) -> Result<JournalEntry, RunError> {
    let trade = find_trade(report, date, query)?;
    let entry = JournalEntry::from_summary(date, trade, notes);
    sink.append(&entry)?;
    Ok(entry)
}
