//! Date windows, fiscal quarters and measurement periods.
//!
//! This module provides [`DateWindow`] for inclusive calendar-day ranges,
//! [`FiscalQuarter`] / [`quarter_window`] for the February-based fiscal
//! quarters (the fourth one spans the year boundary), and [`Period`] for the
//! monthly, quarterly and yearly measurement windows.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDate(s.to_string()))
}

/// Returns the first day of a month.
fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("valid first of month")
}

/// Returns the last day of a month.
pub fn last_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    first_of_month(next_year, next_month)
        .pred_opt()
        .expect("valid predecessor date")
}

/// An inclusive range of calendar days, `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

impl DateWindow {
    /// Creates a new window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        assert!(start <= end, "DateWindow start must be <= end");
        Self { start, end }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        Self {
            start: first_of_month(date.year(), date.month()),
            end: last_of_month(date.year(), date.month()),
        }
    }

    /// The calendar year containing `date`.
    pub fn year_of(date: NaiveDate) -> Self {
        Self {
            start: first_of_month(date.year(), 1),
            end: last_of_month(date.year(), 12),
        }
    }

    /// Checks if a day falls within the window (both ends inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns the number of days in the window.
    pub fn num_days(&self) -> u32 {
        (self.end - self.start).num_days() as u32 + 1
    }

    /// Iterates over every day of the window.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Truncates the window so it ends no later than `last`.
    ///
    /// Returns `None` when `last` is before the window starts.
    pub fn truncate_to(&self, last: NaiveDate) -> Option<Self> {
        if last < self.start {
            None
        } else {
            Some(Self {
                start: self.start,
                end: self.end.min(last),
            })
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Fiscal quarters starting in February.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiscalQuarter {
    /// February - April.
    Q1,
    /// May - July.
    Q2,
    /// August - October.
    Q3,
    /// November - January, spanning the year boundary.
    Q4,
}

impl FiscalQuarter {
    /// Returns the quarter a date belongs to.
    pub fn for_date(date: NaiveDate) -> Self {
        match date.month() {
            2..=4 => Self::Q1,
            5..=7 => Self::Q2,
            8..=10 => Self::Q3,
            _ => Self::Q4,
        }
    }

    /// Returns the months of the quarter in order.
    pub fn months(&self) -> [u32; 3] {
        match self {
            Self::Q1 => [2, 3, 4],
            Self::Q2 => [5, 6, 7],
            Self::Q3 => [8, 9, 10],
            Self::Q4 => [11, 12, 1],
        }
    }

    /// Returns the short name (`Q1`..`Q4`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }

    /// Returns the month-range label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Q1 => "February - April",
            Self::Q2 => "May - July",
            Self::Q3 => "August - October",
            Self::Q4 => "November - January",
        }
    }
}

impl fmt::Display for FiscalQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the fiscal-quarter window containing `date`.
///
/// November, December and January all resolve to the same
/// `[Nov 1, Jan 31]` window, anchored on the year the window starts in.
pub fn quarter_window(date: NaiveDate) -> DateWindow {
    let year = date.year();
    match date.month() {
        11 | 12 => DateWindow::new(first_of_month(year, 11), last_of_month(year + 1, 1)),
        1 => DateWindow::new(first_of_month(year - 1, 11), last_of_month(year, 1)),
        month => {
            let quarter_index = (month - 2) / 3;
            let start_month = quarter_index * 3 + 2;
            DateWindow::new(
                first_of_month(year, start_month),
                last_of_month(year, start_month + 2),
            )
        }
    }
}

/// The window over which compliance is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Calendar month.
    Monthly,
    /// Fiscal quarter.
    #[default]
    Quarterly,
    /// Calendar year.
    Yearly,
}

impl Period {
    /// Returns the window of this period containing `reference`.
    pub fn window(&self, reference: NaiveDate) -> DateWindow {
        match self {
            Self::Monthly => DateWindow::month_of(reference),
            Self::Quarterly => quarter_window(reference),
            Self::Yearly => DateWindow::year_of(reference),
        }
    }

    /// Returns true if `today` lies in the same period as `reference`.
    pub fn is_current(&self, reference: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Self::Monthly => {
                today.month() == reference.month() && today.year() == reference.year()
            }
            Self::Quarterly => quarter_window(reference).contains(today),
            Self::Yearly => today.year() == reference.year(),
        }
    }

    /// Returns the noun used in messages ("month", "quarter", "year").
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Monthly => "month",
            Self::Quarterly => "quarter",
            Self::Yearly => "year",
        }
    }

    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(Self::Monthly),
            "quarterly" | "quarter" => Ok(Self::Quarterly),
            "yearly" | "year" => Ok(Self::Yearly),
            other => Err(format!(
                "unknown period '{}', expected monthly, quarterly or yearly",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod date_window {
        use super::*;

        #[test]
        fn contains_is_inclusive() {
            let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 5));
            assert!(window.contains(date(2024, 1, 1)));
            assert!(window.contains(date(2024, 1, 5)));
            assert!(!window.contains(date(2023, 12, 31)));
            assert!(!window.contains(date(2024, 1, 6)));
            assert_eq!(window.num_days(), 5);
            assert_eq!(window.days().count(), 5);
        }

        #[test]
        #[should_panic(expected = "start must be <= end")]
        fn invalid_window() {
            DateWindow::new(date(2024, 1, 5), date(2024, 1, 1));
        }

        #[test]
        fn month_and_year() {
            let feb = DateWindow::month_of(date(2024, 2, 14));
            assert_eq!(feb.start, date(2024, 2, 1));
            assert_eq!(feb.end, date(2024, 2, 29));

            let year = DateWindow::year_of(date(2025, 6, 1));
            assert_eq!(year.start, date(2025, 1, 1));
            assert_eq!(year.end, date(2025, 12, 31));
        }

        #[test]
        fn truncate_to() {
            let window = DateWindow::new(date(2024, 2, 1), date(2024, 4, 30));
            assert_eq!(
                window.truncate_to(date(2024, 3, 10)).unwrap().end,
                date(2024, 3, 10)
            );
            assert_eq!(window.truncate_to(date(2024, 6, 1)).unwrap(), window);
            assert!(window.truncate_to(date(2024, 1, 31)).is_none());
        }
    }

    mod quarters {
        use super::*;

        #[test]
        fn november_and_december_open_the_wraparound_quarter() {
            for d in [date(2024, 11, 1), date(2024, 12, 31), date(2024, 11, 15)] {
                let window = quarter_window(d);
                assert_eq!(window.start, date(2024, 11, 1));
                assert_eq!(window.end, date(2025, 1, 31));
            }
        }

        #[test]
        fn january_closes_the_previous_wraparound_quarter() {
            let window = quarter_window(date(2025, 1, 20));
            assert_eq!(window.start, date(2024, 11, 1));
            assert_eq!(window.end, date(2025, 1, 31));
        }

        #[test]
        fn february_based_quarters() {
            let q1 = quarter_window(date(2024, 3, 15));
            assert_eq!((q1.start, q1.end), (date(2024, 2, 1), date(2024, 4, 30)));

            let q2 = quarter_window(date(2024, 5, 1));
            assert_eq!((q2.start, q2.end), (date(2024, 5, 1), date(2024, 7, 31)));

            let q3 = quarter_window(date(2024, 10, 31));
            assert_eq!((q3.start, q3.end), (date(2024, 8, 1), date(2024, 10, 31)));
        }

        #[test]
        fn every_day_of_a_year_resolves_to_a_window_containing_it() {
            let year = DateWindow::year_of(date(2024, 1, 1));
            for d in year.days() {
                assert!(quarter_window(d).contains(d), "{}", d);
            }
        }

        #[test]
        fn fiscal_quarter_labels() {
            assert_eq!(FiscalQuarter::for_date(date(2024, 1, 3)), FiscalQuarter::Q4);
            assert_eq!(FiscalQuarter::for_date(date(2024, 2, 3)), FiscalQuarter::Q1);
            assert_eq!(FiscalQuarter::Q4.months(), [11, 12, 1]);
            assert_eq!(FiscalQuarter::Q3.label(), "August - October");
        }
    }

    mod periods {
        use super::*;

        #[test]
        fn windows() {
            let reference = date(2024, 3, 15);
            assert_eq!(Period::Monthly.window(reference).end, date(2024, 3, 31));
            assert_eq!(Period::Quarterly.window(reference).start, date(2024, 2, 1));
            assert_eq!(Period::Yearly.window(reference).start, date(2024, 1, 1));
        }

        #[test]
        fn is_current() {
            let reference = date(2024, 12, 10);
            assert!(Period::Quarterly.is_current(reference, date(2025, 1, 15)));
            assert!(!Period::Monthly.is_current(reference, date(2025, 1, 15)));
            assert!(!Period::Yearly.is_current(reference, date(2025, 1, 15)));
            assert!(Period::Monthly.is_current(reference, date(2024, 12, 1)));
        }

        #[test]
        fn parse() {
            assert_eq!("Monthly".parse::<Period>().unwrap(), Period::Monthly);
            assert_eq!("quarter".parse::<Period>().unwrap(), Period::Quarterly);
            assert!("weekly".parse::<Period>().is_err());
        }

        #[test]
        fn parse_date_format() {
            assert_eq!(parse_date("2024-01-02").unwrap(), date(2024, 1, 2));
            assert!(parse_date("02/01/2024").is_err());
        }
    }
}
