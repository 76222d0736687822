//! TradeSummary and DailyAggregate: the engine's output records.

use super::fill::{OptionType, Side};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Realized result for one symbol (or contract) on one trade date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSummary {
    pub symbol: String,
    pub avg_buy_price: f64,
    pub avg_sell_price: f64,
    /// Accumulated buy-side total quantity.
    pub quantity: f64,
    /// Sell total minus buy total.
    pub pnl: f64,
    pub strike: String,
    pub option_type: OptionType,
    /// Side of the first row seen for this symbol on this date.
    pub action: Side,
}

impl TradeSummary {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

/// Picks summaries out of a day by symbol, optionally narrowed to one
/// contract. With contract grouping a symbol can have several summaries on
/// the same date; strike and option type tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeQuery {
    pub symbol: String,
    pub strike: Option<String>,
    pub option_type: Option<OptionType>,
}

impl TradeQuery {
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            strike: None,
            option_type: None,
        }
    }

    pub fn with_strike(mut self, strike: impl Into<String>) -> Self {
        self.strike = Some(strike.into());
        self
    }

    pub fn with_option_type(mut self, option_type: OptionType) -> Self {
        self.option_type = Some(option_type);
        self
    }

    pub fn matches(&self, trade: &TradeSummary) -> bool {
        trade.symbol == self.symbol
            && self
                .strike
                .as_deref()
                .map_or(true, |s| s.trim() == trade.strike)
            && self.option_type.map_or(true, |o| o == trade.option_type)
    }
}

impl fmt::Display for TradeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)?;
        if let Some(strike) = &self.strike {
            write!(f, " {strike}")?;
        }
        if let Some(option_type) = self.option_type {
            write!(f, " {option_type}")?;
        }
        Ok(())
    }
}

/// All summaries for one date plus their total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub total_pnl: f64,
    /// In the order symbols were first encountered that day.
    pub trades: Vec<TradeSummary>,
}

impl DailyAggregate {
    pub fn new(date: NaiveDate, trades: Vec<TradeSummary>) -> Self {
        let total_pnl = trades.iter().map(|t| t.pnl).sum();
        Self {
            date,
            total_pnl,
            trades,
        }
    }

    /// Every summary `query` selects, in first-seen order.
    pub fn matching<'a>(
        &'a self,
        query: &'a TradeQuery,
    ) -> impl Iterator<Item = &'a TradeSummary> + 'a {
        self.trades.iter().filter(move |t| query.matches(t))
    }
}
