//! Domain types for TradeCal

pub mod diagnostic;
pub mod fill;
pub mod summary;

pub use diagnostic::{Diagnostic, DiagnosticKind, RowError, Severity};
pub use fill::{Fill, OptionType, Side, SourceRef};
pub use summary::{DailyAggregate, TradeQuery, TradeSummary};
