//! Calendar month model: a Sunday-first grid of daily P&L.
//!
//! Presentation-free: callers (the CLI) decide how a cell is drawn. A day
//! with no fills shows as `0.0` and a `Neutral` tone.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("month must be 1-12, got {0}")]
    InvalidMonth(u32),

    #[error("expected YYYY-MM, got {0:?}")]
    InvalidYearMonth(String),

    #[error("{year:04}-{month:02} is outside the supported date range")]
    OutOfRange { year: i32, month: u32 },
}

/// A calendar month, navigable one month at a time.
///
/// Only months whose first day and the first day of the following month
/// are both representable can be built, so every accessor is infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first: NaiveDate,
    days: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        let out_of_range = CalendarError::OutOfRange { year, month };
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(out_of_range.clone())?;
        let following = first
            .checked_add_months(Months::new(1))
            .ok_or(out_of_range.clone())?;
        let days = u32::try_from(following.signed_duration_since(first).num_days())
            .map_err(|_| out_of_range)?;
        Ok(Self { first, days })
    }

    pub fn containing(date: NaiveDate) -> Result<Self, CalendarError> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// The following month. Fails on the last representable month.
    pub fn next(&self) -> Result<Self, CalendarError> {
        let (year, month) = (self.year(), self.month());
        if month == 12 {
            let year = year
                .checked_add(1)
                .ok_or(CalendarError::OutOfRange { year, month: 1 })?;
            Self::new(year, 1)
        } else {
            Self::new(year, month + 1)
        }
    }

    /// The preceding month. Fails on the first representable month.
    pub fn prev(&self) -> Result<Self, CalendarError> {
        let (year, month) = (self.year(), self.month());
        if month == 1 {
            let year = year
                .checked_sub(1)
                .ok_or(CalendarError::OutOfRange { year, month: 12 })?;
            Self::new(year, 12)
        } else {
            Self::new(year, month - 1)
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(&self) -> u32 {
        self.days
    }

    /// English month name, e.g. `March`.
    pub fn month_name(&self) -> &'static str {
        const NAMES: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        NAMES[self.first.month0() as usize]
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl TryFrom<String> for YearMonth {
    type Error = CalendarError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<YearMonth> for String {
    fn from(month: YearMonth) -> Self {
        month.to_string()
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CalendarError::InvalidYearMonth(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(bad)?;
        let year: i32 = y.parse().map_err(|_| bad())?;
        let month: u32 = m.parse().map_err(|_| bad())?;
        Self::new(year, month)
    }
}

/// Sign of a day's P&L, used to color a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    pub fn of(pnl: f64) -> Self {
        if pnl > 0.0 {
            Tone::Positive
        } else if pnl < 0.0 {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub pnl: f64,
    /// Whether the date had any fills at all.
    pub traded: bool,
}

impl DayCell {
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn tone(&self) -> Tone {
        Tone::of(self.pnl)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub total_pnl: f64,
    pub trading_days: usize,
    pub winning_days: usize,
    pub losing_days: usize,
}

/// One week row; index 0 is Sunday.
pub type Week = [Option<DayCell>; 7];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthView {
    pub month: YearMonth,
    pub weeks: Vec<Week>,
    pub summary: MonthSummary,
}

impl MonthView {
    /// Lay out `month` against a daily P&L map.
    pub fn build(month: YearMonth, daily_pnl: &BTreeMap<NaiveDate, f64>) -> Self {
        let first = month.first_day();
        let lead = first.weekday().num_days_from_sunday() as usize;
        let days = month.days_in_month() as usize;

        let mut weeks: Vec<Week> = Vec::new();
        let mut current: Week = [None; 7];
        let mut summary = MonthSummary::default();

        for (offset, date) in first.iter_days().take(days).enumerate() {
            let slot = (lead + offset) % 7;
            let traded = daily_pnl.get(&date).copied();

            if let Some(pnl) = traded {
                summary.total_pnl += pnl;
                summary.trading_days += 1;
                match Tone::of(pnl) {
                    Tone::Positive => summary.winning_days += 1,
                    Tone::Negative => summary.losing_days += 1,
                    Tone::Neutral => {}
                }
            }

            current[slot] = Some(DayCell {
                date,
                pnl: traded.unwrap_or(0.0),
                traded: traded.is_some(),
            });

            if slot == 6 {
                weeks.push(current);
                current = [None; 7];
            }
        }
        if current.iter().any(Option::is_some) {
            weeks.push(current);
        }

        Self {
            month,
            weeks,
            summary,
        }
    }

    pub fn cell(&self, day: u32) -> Option<&DayCell> {
        self.weeks
            .iter()
            .flat_map(|w| w.iter())
            .flatten()
            .find(|c| c.day() == day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn test_navigation_steps_whole_months() {
        assert_eq!(ym(2024, 1).prev(), Ok(ym(2023, 12)));
        assert_eq!(ym(2024, 12).next(), Ok(ym(2025, 1)));
        assert_eq!(ym(2024, 1).next().and_then(|m| m.next()), Ok(ym(2024, 3)));
    }

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(ym(2024, 2).days_in_month(), 29);
        assert_eq!(ym(2023, 2).days_in_month(), 28);
        assert_eq!(ym(2024, 12).days_in_month(), 31);
        assert_eq!(ym(2024, 4).days_in_month(), 30);
    }

    #[test]
    fn test_parse_year_month() {
        assert_eq!("2024-03".parse::<YearMonth>().unwrap(), ym(2024, 3));
        assert_eq!(ym(2024, 3).to_string(), "2024-03");
        assert_eq!(
            "2024-13".parse::<YearMonth>(),
            Err(CalendarError::InvalidMonth(13))
        );
        assert!(matches!(
            "March".parse::<YearMonth>(),
            Err(CalendarError::InvalidYearMonth(_))
        ));
    }

    #[test]
    fn test_months_past_the_date_range_are_rejected() {
        // The last representable date is 262142-12-31, so December of that
        // year has no following month to measure against.
        assert_eq!(
            "262142-12".parse::<YearMonth>(),
            Err(CalendarError::OutOfRange {
                year: 262142,
                month: 12
            })
        );
        assert!(matches!(
            "262143-12".parse::<YearMonth>(),
            Err(CalendarError::OutOfRange { .. })
        ));
        assert!(matches!(
            YearMonth::new(i32::MAX, 1),
            Err(CalendarError::OutOfRange { .. })
        ));

        let last = ym(262142, 11);
        assert_eq!(last.days_in_month(), 30);
        assert!(matches!(last.next(), Err(CalendarError::OutOfRange { .. })));
        assert!(YearMonth::containing(NaiveDate::MAX).is_err());
    }

    #[test]
    fn test_year_month_serializes_as_text() {
        let json = serde_json::to_string(&ym(2024, 3)).unwrap();
        assert_eq!(json, "\"2024-03\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym(2024, 3));
        assert!(serde_json::from_str::<YearMonth>("\"262142-12\"").is_err());
    }

    #[test]
    fn test_grid_starts_on_sunday() {
        // 2024-03-01 is a Friday.
        let view = MonthView::build(ym(2024, 3), &BTreeMap::new());
        assert_eq!(view.weeks.len(), 6);
        assert!(view.weeks[0][..5].iter().all(Option::is_none));
        assert_eq!(view.weeks[0][5].unwrap().day(), 1);
        assert_eq!(view.weeks[0][6].unwrap().day(), 2);
        assert_eq!(view.weeks[1][0].unwrap().day(), 3);
        // 31st is a Sunday, alone in the last row.
        assert_eq!(view.weeks[5][0].unwrap().day(), 31);
        assert!(view.weeks[5][1..].iter().all(Option::is_none));
    }

    #[test]
    fn test_cells_carry_pnl_and_tone() {
        let mut pnl = BTreeMap::new();
        pnl.insert(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 50.0);
        pnl.insert(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), -20.0);
        pnl.insert(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 0.0);
        pnl.insert(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), 999.0);

        let view = MonthView::build(ym(2024, 3), &pnl);
        assert_eq!(view.cell(1).unwrap().tone(), Tone::Positive);
        assert_eq!(view.cell(4).unwrap().tone(), Tone::Negative);
        assert_eq!(view.cell(5).unwrap().tone(), Tone::Neutral);
        assert!(view.cell(5).unwrap().traded);
        assert!(!view.cell(6).unwrap().traded);
        assert_eq!(view.cell(6).unwrap().pnl, 0.0);

        assert_eq!(
            view.summary,
            MonthSummary {
                total_pnl: 30.0,
                trading_days: 3,
                winning_days: 1,
                losing_days: 1,
            }
        );
    }

    #[test]
    fn test_february_starting_sunday_fits_four_rows() {
        // 2015-02-01 is a Sunday, 28 days.
        let view = MonthView::build(ym(2015, 2), &BTreeMap::new());
        assert_eq!(view.weeks.len(), 4);
        assert_eq!(view.month.month_name(), "February");
    }
}
