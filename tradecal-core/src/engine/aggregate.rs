//! Aggregation: canonical fills into daily P&L and per-symbol summaries.
//!
//! Pure function of its input. Every call builds its own two-level ordered
//! map (date → key → accumulator), derives summaries from it and drops it.
//! Nothing is shared between runs.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    DailyAggregate, Diagnostic, DiagnosticKind, Fill, OptionType, Side, TradeSummary,
};

/// What one summary row represents within a trade date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// One summary per underlying symbol. Strike and type come from the
    /// first row seen for that symbol that day.
    #[default]
    Symbol,
    /// One summary per (symbol, strike, option type).
    Contract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateOptions {
    pub group_by: GroupBy,
}

/// Engine output: both maps are keyed by trade date, ascending.
///
/// A date is present in both maps or in neither.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub daily_pnl: BTreeMap<NaiveDate, f64>,
    pub trade_details: BTreeMap<NaiveDate, Vec<TradeSummary>>,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.daily_pnl.is_empty()
    }

    /// Number of dates with at least one fill.
    pub fn trading_days(&self) -> usize {
        self.daily_pnl.len()
    }

    /// Sum of every daily total.
    pub fn total_pnl(&self) -> f64 {
        self.daily_pnl.values().sum()
    }

    pub fn pnl_on(&self, date: NaiveDate) -> Option<f64> {
        self.daily_pnl.get(&date).copied()
    }

    pub fn day(&self, date: NaiveDate) -> Option<DailyAggregate> {
        let trades = self.trade_details.get(&date)?;
        Some(DailyAggregate {
            date,
            total_pnl: self.daily_pnl.get(&date).copied().unwrap_or(0.0),
            trades: trades.clone(),
        })
    }

    pub fn days(&self) -> impl Iterator<Item = DailyAggregate> + '_ {
        self.daily_pnl.keys().filter_map(|d| self.day(*d))
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.daily_pnl.keys().next_back().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    symbol: String,
    contract: Option<(String, OptionType)>,
}

impl GroupKey {
    fn for_fill(fill: &Fill, group_by: GroupBy) -> Self {
        let contract = match group_by {
            GroupBy::Symbol => None,
            GroupBy::Contract => Some((fill.strike.clone(), fill.option_type)),
        };
        Self {
            symbol: fill.symbol.clone(),
            contract,
        }
    }
}

/// Running totals for one key on one date.
#[derive(Debug, Clone)]
struct Accumulator {
    symbol: String,
    buy_total: f64,
    sell_total: f64,
    buy_qty: f64,
    side: Side,
    strike: String,
    option_type: OptionType,
    mismatch_reported: bool,
}

impl Accumulator {
    fn open(fill: &Fill) -> Self {
        Self {
            symbol: fill.symbol.clone(),
            buy_total: 0.0,
            sell_total: 0.0,
            buy_qty: 0.0,
            side: fill.side,
            strike: fill.strike.clone(),
            option_type: fill.option_type,
            mismatch_reported: false,
        }
    }

    fn apply(&mut self, fill: &Fill) {
        match fill.side {
            Side::Buy => {
                self.buy_total += fill.trade_value();
                self.buy_qty += fill.total_qty;
            }
            Side::Sell => {
                self.sell_total += fill.trade_value();
            }
        }
    }

    fn contract_label(strike: &str, option_type: OptionType) -> String {
        format!("{strike} {option_type}")
    }

    /// Divide by the buy-side quantity, or 0 when nothing was bought.
    fn per_unit(&self, total: f64) -> f64 {
        if self.buy_qty > 0.0 {
            total / self.buy_qty
        } else {
            0.0
        }
    }

    fn finish(self) -> TradeSummary {
        TradeSummary {
            avg_buy_price: self.per_unit(self.buy_total),
            avg_sell_price: self.per_unit(self.sell_total),
            quantity: self.buy_qty,
            pnl: self.sell_total - self.buy_total,
            symbol: self.symbol,
            strike: self.strike,
            option_type: self.option_type,
            action: self.side,
        }
    }
}

/// Accumulators for a single date, in first-seen order.
#[derive(Default)]
struct DayBook {
    order: Vec<Accumulator>,
    index: HashMap<GroupKey, usize>,
}

impl DayBook {
    fn record(&mut self, fill: &Fill, group_by: GroupBy, diagnostics: &mut Vec<Diagnostic>) {
        let key = GroupKey::for_fill(fill, group_by);
        let slot = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                self.order.push(Accumulator::open(fill));
                self.index.insert(key, self.order.len() - 1);
                self.order.len() - 1
            }
        };

        let acc = &mut self.order[slot];
        if !acc.mismatch_reported
            && (acc.strike != fill.strike || acc.option_type != fill.option_type)
        {
            acc.mismatch_reported = true;
            let diag = Diagnostic {
                origin: fill.origin.clone(),
                symbol: Some(fill.symbol.clone()),
                kind: DiagnosticKind::ContractMismatch {
                    symbol: fill.symbol.clone(),
                    expected: Accumulator::contract_label(&acc.strike, acc.option_type),
                    found: Accumulator::contract_label(&fill.strike, fill.option_type),
                },
            };
            warn!(target: "tradecal::aggregate", "{diag}");
            diagnostics.push(diag);
        }
        acc.apply(fill);
    }

    fn into_summaries(self) -> Vec<TradeSummary> {
        self.order.into_iter().map(Accumulator::finish).collect()
    }
}

/// Aggregate fills into daily totals and per-key summaries.
pub fn aggregate(fills: &[Fill], options: &AggregateOptions) -> Aggregation {
    aggregate_with_diagnostics(fills, options).0
}

/// Same as [`aggregate`], also returning the warnings raised while grouping
/// (rows whose contract disagrees with the one captured for their symbol).
pub fn aggregate_with_diagnostics(
    fills: &[Fill],
    options: &AggregateOptions,
) -> (Aggregation, Vec<Diagnostic>) {
    let mut by_date: BTreeMap<NaiveDate, Vec<&Fill>> = BTreeMap::new();
    for fill in fills {
        by_date.entry(fill.trade_date).or_default().push(fill);
    }

    let mut out = Aggregation::default();
    let mut diagnostics = Vec::new();

    for (date, day_fills) in by_date {
        let mut book = DayBook::default();
        for fill in &day_fills {
            book.record(fill, options.group_by, &mut diagnostics);
        }

        let summaries = book.into_summaries();
        let total: f64 = summaries.iter().map(|s| s.pnl).sum();
        debug!(
            target: "tradecal::aggregate",
            %date,
            rows = day_fills.len(),
            summaries = summaries.len(),
            total,
            "aggregated trade date"
        );

        out.daily_pnl.insert(date, total);
        out.trade_details.insert(date, summaries);
    }

    (out, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceRef;

    fn fill(
        date: (i32, u32, u32),
        symbol: &str,
        side: Side,
        name: &str,
        price: f64,
        filled: f64,
        total_qty: f64,
    ) -> Fill {
        let d = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        let strike = name.split_whitespace().nth(2).unwrap_or("").to_string();
        Fill {
            origin: SourceRef::new("t.csv", 2),
            symbol: symbol.into(),
            side,
            filled,
            avg_price: price,
            total_qty,
            filled_time: d.and_hms_opt(10, 0, 0).unwrap(),
            trade_date: d,
            name: name.into(),
            strike,
            option_type: if name.contains("Call") {
                OptionType::Call
            } else {
                OptionType::Put
            },
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_round_trip_buy_then_sell() {
        let fills = vec![
            fill((2024, 3, 1), "AAPL", Side::Buy, "AAPL 03/21 150 Call", 150.0, 1.0, 1.0),
            fill((2024, 3, 1), "AAPL", Side::Sell, "AAPL 03/21 150 Call", 200.0, 1.0, 1.0),
        ];
        let agg = aggregate(&fills, &AggregateOptions::default());

        assert_eq!(agg.pnl_on(date(2024, 3, 1)), Some(50.0));
        let trades = &agg.trade_details[&date(2024, 3, 1)];
        assert_eq!(
            trades,
            &vec![TradeSummary {
                symbol: "AAPL".into(),
                avg_buy_price: 150.0,
                avg_sell_price: 200.0,
                quantity: 1.0,
                pnl: 50.0,
                strike: "150".into(),
                option_type: OptionType::Call,
                action: Side::Buy,
            }]
        );
    }

    #[test]
    fn test_buy_quantity_comes_from_total_qty() {
        // Two partial fills of a 3-lot order.
        let fills = vec![
            fill((2024, 3, 1), "SPY", Side::Buy, "SPY 03/01 505 Put", 100.0, 1.0, 3.0),
            fill((2024, 3, 1), "SPY", Side::Buy, "SPY 03/01 505 Put", 100.0, 2.0, 3.0),
        ];
        let agg = aggregate(&fills, &AggregateOptions::default());
        let s = &agg.trade_details[&date(2024, 3, 1)][0];
        assert_eq!(s.quantity, 6.0);
        assert_eq!(s.avg_buy_price, 50.0);
        assert_eq!(s.pnl, -300.0);
    }

    #[test]
    fn test_buy_only_symbol() {
        let fills = vec![fill((2024, 3, 4), "TSLA", Side::Buy, "TSLA 03/08 200 Put", 310.0, 2.0, 2.0)];
        let agg = aggregate(&fills, &AggregateOptions::default());
        let s = &agg.trade_details[&date(2024, 3, 4)][0];
        assert_eq!(s.pnl, -620.0);
        assert_eq!(s.avg_sell_price, 0.0);
        assert_eq!(s.avg_buy_price, 310.0);
    }

    #[test]
    fn test_sell_only_symbol_has_zero_averages() {
        let fills = vec![fill((2024, 3, 4), "NVDA", Side::Sell, "NVDA 03/08 900 Call", 420.0, 1.0, 1.0)];
        let agg = aggregate(&fills, &AggregateOptions::default());
        let s = &agg.trade_details[&date(2024, 3, 4)][0];
        assert_eq!(s.avg_buy_price, 0.0);
        assert_eq!(s.avg_sell_price, 0.0);
        assert_eq!(s.quantity, 0.0);
        assert_eq!(s.pnl, 420.0);
        assert_eq!(s.action, Side::Sell);
    }

    #[test]
    fn test_symbols_keep_first_seen_order_and_dates_are_separate() {
        let fills = vec![
            fill((2024, 3, 5), "TSLA", Side::Buy, "TSLA 03/08 200 Put", 100.0, 1.0, 1.0),
            fill((2024, 3, 4), "MSFT", Side::Buy, "MSFT 03/08 400 Call", 100.0, 1.0, 1.0),
            fill((2024, 3, 5), "AAPL", Side::Buy, "AAPL 03/08 170 Call", 100.0, 1.0, 1.0),
            fill((2024, 3, 5), "TSLA", Side::Sell, "TSLA 03/08 200 Put", 150.0, 1.0, 1.0),
        ];
        let agg = aggregate(&fills, &AggregateOptions::default());

        let dates: Vec<_> = agg.daily_pnl.keys().copied().collect();
        assert_eq!(dates, vec![date(2024, 3, 4), date(2024, 3, 5)]);

        let symbols: Vec<_> = agg.trade_details[&date(2024, 3, 5)]
            .iter()
            .map(|s| s.symbol.as_str())
            .collect();
        assert_eq!(symbols, vec!["TSLA", "AAPL"]);
        assert_eq!(agg.pnl_on(date(2024, 3, 5)), Some(-50.0));
        assert_eq!(agg.pnl_on(date(2024, 3, 6)), None);
        assert_eq!(agg.last_date(), Some(date(2024, 3, 5)));
    }

    #[test]
    fn test_first_row_wins_strike_and_flags_mismatch() {
        let fills = vec![
            fill((2024, 3, 1), "AAPL", Side::Buy, "AAPL 03/21 150 Call", 100.0, 1.0, 1.0),
            fill((2024, 3, 1), "AAPL", Side::Sell, "AAPL 03/21 155 Call", 80.0, 1.0, 1.0),
            fill((2024, 3, 1), "AAPL", Side::Sell, "AAPL 03/21 160 Call", 80.0, 1.0, 1.0),
        ];
        let (agg, diags) = aggregate_with_diagnostics(&fills, &AggregateOptions::default());
        let trades = &agg.trade_details[&date(2024, 3, 1)];
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].strike, "150");
        assert_eq!(trades[0].pnl, 60.0);

        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].kind,
            DiagnosticKind::ContractMismatch {
                symbol: "AAPL".into(),
                expected: "150 Call".into(),
                found: "155 Call".into(),
            }
        );
    }

    #[test]
    fn test_group_by_contract_splits_legs() {
        let fills = vec![
            fill((2024, 3, 1), "AAPL", Side::Buy, "AAPL 03/21 150 Call", 100.0, 1.0, 1.0),
            fill((2024, 3, 1), "AAPL", Side::Sell, "AAPL 03/21 155 Call", 80.0, 1.0, 1.0),
        ];
        let opts = AggregateOptions {
            group_by: GroupBy::Contract,
        };
        let (agg, diags) = aggregate_with_diagnostics(&fills, &opts);
        assert!(diags.is_empty());

        let trades = &agg.trade_details[&date(2024, 3, 1)];
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].strike, "150");
        assert_eq!(trades[1].strike, "155");
        assert_eq!(agg.pnl_on(date(2024, 3, 1)), Some(-20.0));
    }

    #[test]
    fn test_empty_input_gives_empty_maps() {
        let agg = aggregate(&[], &AggregateOptions::default());
        assert!(agg.is_empty());
        assert!(agg.trade_details.is_empty());
        assert_eq!(agg.total_pnl(), 0.0);
        assert_eq!(agg.days().count(), 0);
    }

    #[test]
    fn test_day_view_matches_maps() {
        let fills = vec![
            fill((2024, 3, 1), "AAPL", Side::Buy, "AAPL 03/21 150 Call", 150.0, 1.0, 1.0),
            fill((2024, 3, 1), "SPY", Side::Sell, "SPY 03/21 500 Put", 75.0, 1.0, 1.0),
        ];
        let agg = aggregate(&fills, &AggregateOptions::default());
        let day = agg.day(date(2024, 3, 1)).unwrap();
        assert_eq!(day.total_pnl, -75.0);
        assert_eq!(day.trades.len(), 2);
        assert!(agg.day(date(2024, 3, 2)).is_none());
    }
}
