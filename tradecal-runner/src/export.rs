//! Report export: JSON and CSV artifact generation.
//!
//! - **JSON**: the full `BatchReport`, schema-versioned
//! - **CSV**: daily totals and the per-symbol trade table
//!
//! Unknown schema versions are rejected on load.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tradecal_core::engine::{Aggregation, BatchReport, SCHEMA_VERSION};
use tradecal_core::journal::format_quantity;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BatchReport` to pretty JSON.
pub fn export_report_json(report: &BatchReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BatchReport to JSON")
}

/// Deserialize a `BatchReport`, rejecting schema versions newer than ours.
pub fn import_report_json(json: &str) -> Result<BatchReport> {
    let report: BatchReport =
        serde_json::from_str(json).context("failed to deserialize BatchReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One `date,pnl` row per trading day, ascending.
pub fn export_daily_csv(aggregation: &Aggregation) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "pnl"])?;
    for (date, pnl) in &aggregation.daily_pnl {
        wtr.write_record([&date.to_string(), &format!("{:.2}", pnl)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Every trade summary, by date then first-seen order.
///
/// Columns: date, symbol, action, type, strike, quantity, avg_buy_price,
/// avg_sell_price, pnl
pub fn export_trades_csv(aggregation: &Aggregation) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "symbol",
        "action",
        "type",
        "strike",
        "quantity",
        "avg_buy_price",
        "avg_sell_price",
        "pnl",
    ])?;

    for (date, trades) in &aggregation.trade_details {
        for t in trades {
            wtr.write_record([
                &date.to_string(),
                &t.symbol,
                &t.action.to_string(),
                &t.option_type.to_string(),
                &t.strike,
                &format_quantity(t.quantity),
                &format!("{:.2}", t.avg_buy_price),
                &format!("{:.2}", t.avg_sell_price),
                &format!("{:.2}", t.pnl),
            ])?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for one report into `output_dir`:
/// - `report.json`: the full `BatchReport`
/// - `daily.csv`: daily totals
/// - `trades.csv`: per-symbol summaries
pub fn save_artifacts(report: &BatchReport, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create artifact dir: {}", output_dir.display()))?;

    let json = export_report_json(report)?;
    std::fs::write(output_dir.join("report.json"), json)?;

    let daily = export_daily_csv(&report.aggregation)?;
    std::fs::write(output_dir.join("daily.csv"), daily)?;

    let trades = export_trades_csv(&report.aggregation)?;
    std::fs::write(output_dir.join("trades.csv"), trades)?;

    Ok(())
}

/// Load a `BatchReport` from an artifact directory's `report.json`.
pub fn load_artifacts(dir: &Path) -> Result<BatchReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_report_json(&json)
}
