//! TradeCal CLI: daily options P&L from broker exports, plus a trade journal.
//!
//! Commands:
//! - `report`: daily P&L table and diagnostics, optionally saved as artifacts
//! - `calendar`: month grid of daily P&L
//! - `day`: per-symbol details for one trade date
//! - `note`: append a journal entry for one trade
//! - `journal show|import|export`: read, replace or copy the journal file

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tradecal_core::calendar::{MonthView, YearMonth};
use tradecal_core::domain::{DailyAggregate, OptionType, TradeQuery};
use tradecal_core::engine::BatchReport;
use tradecal_core::journal::{format_quantity, NoteSource};
use tradecal_runner::{run_report, save_artifacts, save_note, AppConfig, JournalFile};

/// How many diagnostics `report` prints before summarizing the rest.
const DIAGNOSTICS_SHOWN: usize = 10;

#[derive(Parser)]
#[command(
    name = "tradecal",
    about = "TradeCal CLI: options trading P&L calendar and journal"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate exports into daily P&L and list diagnostics.
    Report {
        /// Broker CSV exports, read in order.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Save report.json, daily.csv and trades.csv here.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Show a month calendar of daily P&L.
    Calendar {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Month to show (YYYY-MM). Defaults to the month of the latest trade.
        #[arg(long)]
        month: Option<String>,
    },
    /// Show every trade on one date.
    Day {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Trade date (YYYY-MM-DD).
        #[arg(long)]
        date: String,
    },
    /// Append a journal note for one trade.
    Note {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Trade date (YYYY-MM-DD).
        #[arg(long)]
        date: String,

        /// Symbol traded that day.
        #[arg(long)]
        symbol: String,

        /// Strike, when the symbol traded more than one contract that day.
        #[arg(long)]
        strike: Option<String>,

        /// Option type, when the symbol traded more than one contract that day.
        #[arg(long = "type", value_enum)]
        option_type: Option<RightArg>,

        /// Note text.
        #[arg(long)]
        text: String,
    },
    /// Journal file commands.
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RightArg {
    Call,
    Put,
}

impl From<RightArg> for OptionType {
    fn from(arg: RightArg) -> Self {
        match arg {
            RightArg::Call => OptionType::Call,
            RightArg::Put => OptionType::Put,
        }
    }
}

#[derive(Subcommand)]
enum JournalAction {
    /// Print the whole journal.
    Show,
    /// Replace the journal with an uploaded file.
    Import { file: PathBuf },
    /// Copy the journal to a download path.
    Export { file: PathBuf },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Report { files, out_dir } => run_report_cmd(&config, &files, out_dir.as_deref()),
        Commands::Calendar { files, month } => run_calendar(&config, &files, month.as_deref()),
        Commands::Day { files, date } => run_day(&config, &files, &date),
        Commands::Note {
            files,
            date,
            symbol,
            strike,
            option_type,
            text,
        } => {
            let mut query = TradeQuery::symbol(symbol);
            if let Some(strike) = strike {
                query = query.with_strike(strike);
            }
            if let Some(option_type) = option_type {
                query = query.with_option_type(option_type.into());
            }
            run_note(&config, &files, &date, &query, &text)
        }
        Commands::Journal { action } => run_journal(&config, action),
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the `warn` default.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => AppConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(AppConfig::default()),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD"))
}

fn build_report(config: &AppConfig, files: &[PathBuf]) -> Result<BatchReport> {
    run_report(config, files).context("failed to build report")
}

fn run_report_cmd(config: &AppConfig, files: &[PathBuf], out_dir: Option<&Path>) -> Result<()> {
    let report = build_report(config, files)?;
    print_summary(&report);

    if let Some(dir) = out_dir {
        save_artifacts(&report, dir)?;
        println!();
        println!("Artifacts saved to: {}", dir.display());
    }
    Ok(())
}

fn run_calendar(config: &AppConfig, files: &[PathBuf], month: Option<&str>) -> Result<()> {
    let report = build_report(config, files)?;
    let month = match month {
        Some(raw) => raw.parse::<YearMonth>()?,
        None => {
            let anchor = report
                .aggregation
                .last_date()
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            YearMonth::containing(anchor)?
        }
    };

    let view = MonthView::build(month, &report.aggregation.daily_pnl);
    print_calendar(&view);
    Ok(())
}

fn run_day(config: &AppConfig, files: &[PathBuf], date: &str) -> Result<()> {
    let date = parse_date(date)?;
    let report = build_report(config, files)?;

    match report.aggregation.day(date) {
        Some(day) => print_day(&day),
        None => println!("No trades for {date}"),
    }
    Ok(())
}

fn run_note(
    config: &AppConfig,
    files: &[PathBuf],
    date: &str,
    query: &TradeQuery,
    text: &str,
) -> Result<()> {
    let date = parse_date(date)?;
    let report = build_report(config, files)?;
    let mut journal = JournalFile::new(&config.journal.path);

    let entry = save_note(&report, &mut journal, date, query, text)?;
    println!(
        "Saved note for {} {} {} on {} to {}",
        entry.symbol,
        entry.strike,
        entry.option_type,
        entry.date,
        journal.path().display()
    );
    Ok(())
}

fn run_journal(config: &AppConfig, action: JournalAction) -> Result<()> {
    let journal = JournalFile::new(&config.journal.path);

    match action {
        JournalAction::Show => {
            print!("{}", journal.read_all()?);
            if !journal.exists() {
                println!();
            }
        }
        JournalAction::Import { file } => {
            if !file.is_file() {
                bail!("journal file not found: {}", file.display());
            }
            journal.replace_with(&file)?;
            let count = journal.entries()?.len();
            println!(
                "Imported {} ({count} entries) into {}",
                file.display(),
                journal.path().display()
            );
        }
        JournalAction::Export { file } => {
            journal.export_to(&file)?;
            println!("Journal exported to: {}", file.display());
        }
    }
    Ok(())
}

// ─── Output ─────────────────────────────────────────────────────────

fn signed_money(value: f64) -> String {
    if value > 0.0 {
        format!("+${value:.2}")
    } else if value < 0.0 {
        format!("-${:.2}", value.abs())
    } else {
        "$0.00".to_string()
    }
}

fn print_summary(report: &BatchReport) {
    let agg = &report.aggregation;

    println!();
    println!("=== Daily P&L ===");
    println!("Rows read:      {}", report.rows_read);
    println!("Fills:          {}", report.fill_count);
    println!("Excluded rows:  {}", report.excluded_count());
    println!("Warnings:       {}", report.warnings().count());
    println!("Trading days:   {}", agg.trading_days());
    println!("Total P&L:      {}", signed_money(agg.total_pnl()));
    println!("Fingerprint:    {}", report.fingerprint);

    if !agg.is_empty() {
        println!();
        println!("{:<12} {:>14} {:>7}", "Date", "P&L", "Trades");
        println!("{}", "-".repeat(35));
        for (date, pnl) in &agg.daily_pnl {
            let trades = agg.trade_details.get(date).map_or(0, Vec::len);
            println!("{:<12} {:>14} {:>7}", date, signed_money(*pnl), trades);
        }
    }

    if !report.diagnostics.is_empty() {
        println!();
        println!("--- Diagnostics ---");
        for diag in report.diagnostics.iter().take(DIAGNOSTICS_SHOWN) {
            println!("{diag}");
        }
        if report.diagnostics.len() > DIAGNOSTICS_SHOWN {
            println!("... and {} more", report.diagnostics.len() - DIAGNOSTICS_SHOWN);
        }
    }
}

fn print_calendar(view: &MonthView) {
    const CELL: usize = 11;

    println!();
    println!("{} {}", view.month.month_name(), view.month.year());
    for name in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"] {
        print!("{name:<CELL$}");
    }
    println!();
    println!("{}", "-".repeat(CELL * 7));

    for week in &view.weeks {
        for cell in week {
            match cell {
                Some(c) => print!("{:<CELL$}", c.day()),
                None => print!("{:<CELL$}", ""),
            }
        }
        println!();
        for cell in week {
            let text = match cell {
                Some(c) if c.traded => signed_money(c.pnl),
                Some(_) => ".".to_string(),
                None => String::new(),
            };
            print!("{text:<CELL$}");
        }
        println!();
    }

    let s = &view.summary;
    println!();
    println!("Month P&L:      {}", signed_money(s.total_pnl));
    println!("Trading days:   {}", s.trading_days);
    println!("Winning days:   {}", s.winning_days);
    println!("Losing days:    {}", s.losing_days);
}

fn print_day(day: &DailyAggregate) {
    println!();
    println!("=== {} ===", day.date);
    println!("Total P&L: {}", signed_money(day.total_pnl));
    println!();
    println!(
        "{:<8} {:<6} {:<5} {:>8} {:>6} {:>12} {:>12} {:>12}",
        "Symbol", "Action", "Type", "Strike", "Qty", "Avg Buy", "Avg Sell", "P&L"
    );
    println!("{}", "-".repeat(76));
    for t in &day.trades {
        println!(
            "{:<8} {:<6} {:<5} {:>8} {:>6} {:>12} {:>12} {:>12}",
            t.symbol,
            t.action.to_string(),
            t.option_type.to_string(),
            t.strike,
            format_quantity(t.quantity),
            format!("${:.2}", t.avg_buy_price),
            format!("${:.2}", t.avg_sell_price),
            signed_money(t.pnl),
        );
    }
}
