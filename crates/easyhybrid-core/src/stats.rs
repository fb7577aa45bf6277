//! Attendance statistics.
//!
//! Every function here is pure: the result depends only on the attendance
//! log, the holidays, the target rate and the dates passed in, so it is safe
//! to recompute on every render.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::attendance::{AttendanceLog, HolidayCalendar, TargetRate};
use crate::period::{DateWindow, Period, quarter_window};

/// Returns true for a day that is not a weekend and not a holiday.
pub fn is_workday(date: NaiveDate, holiday_dates: &HashSet<NaiveDate>) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !holiday_dates.contains(&date)
}

/// Counts the workdays in a window.
pub fn total_workdays(window: DateWindow, holidays: &HolidayCalendar) -> u32 {
    count_workdays(window, &holidays.dates())
}

fn count_workdays(window: DateWindow, holiday_dates: &HashSet<NaiveDate>) -> u32 {
    window
        .days()
        .filter(|d| is_workday(*d, holiday_dates))
        .count() as u32
}

/// Counts the present records dated inside a window.
pub fn present_days(window: DateWindow, attendance: &AttendanceLog) -> u32 {
    attendance
        .iter()
        .filter(|r| r.present && window.contains(r.date))
        .count() as u32
}

/// `numerator / denominator * 100`, or 0 when the denominator is 0.
pub fn percentage(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator) * 100.0
    }
}

/// Full-period projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    /// The measured window.
    pub window: DateWindow,
    /// Workdays in the whole window.
    pub total_workdays: u32,
    /// Present days recorded in the window.
    pub present_days: u32,
    /// Days needed to meet the target.
    pub required_days: u32,
    /// `present / required * 100`.
    pub percentage: f64,
}

impl PeriodStats {
    /// Days still missing to reach the target (never negative).
    pub fn days_still_needed(&self) -> u32 {
        self.required_days.saturating_sub(self.present_days)
    }

    /// Returns true once the target has been reached.
    pub fn target_met(&self) -> bool {
        self.present_days >= self.required_days
    }
}

/// Progress from the start of the window up to today.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentProgress {
    /// `[start, min(today, end)]`, or `None` when today precedes the window.
    pub window: Option<DateWindow>,
    /// Workdays elapsed so far.
    pub workdays_so_far: u32,
    /// Present days up to today.
    pub present_days: u32,
    /// `present / workdays_so_far * 100`.
    pub rate: f64,
}

/// Quarter-to-date figure through the end of the previous month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMonthProgress {
    /// Full month name of the previous month.
    pub month_name: String,
    /// Year of the previous month.
    pub year: i32,
    /// Present days from quarter start through the end of that month.
    pub office_days: u32,
    /// Workdays in the same range.
    pub workdays: u32,
    /// `office_days / workdays * 100`.
    pub percentage: f64,
}

/// How a single day shows up in the calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    /// Reported and present.
    Present,
    /// Reported but not present.
    Absent,
    /// A holiday with no present record.
    Holiday,
    /// Saturday or Sunday with no record.
    Weekend,
    /// A workday nobody reported.
    Unreported,
}

/// Everything shown for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    /// The period kind.
    pub period: Period,
    /// The date the period was resolved from.
    pub reference: NaiveDate,
    /// The target rate used.
    pub target_rate: TargetRate,
    /// Full-period projection.
    pub stats: PeriodStats,
    /// Progress so far, only when the period contains today.
    pub current: Option<CurrentProgress>,
    /// Quarter-to-date through last month, only for quarterly reports.
    pub through_last_month: Option<LastMonthProgress>,
}

/// Computes statistics over borrowed user data.
#[derive(Debug, Clone)]
pub struct PeriodCalculator<'a> {
    attendance: &'a AttendanceLog,
    holidays: &'a HolidayCalendar,
    holiday_dates: HashSet<NaiveDate>,
    target: TargetRate,
}

impl<'a> PeriodCalculator<'a> {
    /// Creates a calculator.
    pub fn new(
        attendance: &'a AttendanceLog,
        holidays: &'a HolidayCalendar,
        target: TargetRate,
    ) -> Self {
        Self {
            attendance,
            holidays,
            holiday_dates: holidays.dates(),
            target,
        }
    }

    /// Full-period statistics for an arbitrary window.
    pub fn window_stats(&self, window: DateWindow) -> PeriodStats {
        let total_workdays = count_workdays(window, &self.holiday_dates);
        let present_days = present_days(window, self.attendance);
        let required_days = self.target.required_days(total_workdays);

        PeriodStats {
            window,
            total_workdays,
            present_days,
            required_days,
            percentage: percentage(present_days, required_days),
        }
    }

    /// Full-period statistics for the period containing `reference`.
    pub fn period_stats(&self, period: Period, reference: NaiveDate) -> PeriodStats {
        self.window_stats(period.window(reference))
    }

    /// Progress from the start of the period up to `today`.
    ///
    /// Records dated after today are ignored even if they fall inside the period.
    pub fn current_progress(
        &self,
        period: Period,
        reference: NaiveDate,
        today: NaiveDate,
    ) -> CurrentProgress {
        let Some(so_far) = period.window(reference).truncate_to(today) else {
            return CurrentProgress {
                window: None,
                workdays_so_far: 0,
                present_days: 0,
                rate: 0.0,
            };
        };

        let workdays_so_far = count_workdays(so_far, &self.holiday_dates);
        let present_days = present_days(so_far, self.attendance);

        CurrentProgress {
            window: Some(so_far),
            workdays_so_far,
            present_days,
            rate: percentage(present_days, workdays_so_far),
        }
    }

    /// Quarter-to-date rate through the last day of the month before `today`.
    ///
    /// Returns `None` when that day falls before the quarter of `reference` starts.
    pub fn progress_through_last_month(
        &self,
        reference: NaiveDate,
        today: NaiveDate,
    ) -> Option<LastMonthProgress> {
        let last_day_of_last_month = today.with_day(1)?.pred_opt()?;
        let range = quarter_window(reference).truncate_to(last_day_of_last_month)?;

        let workdays = count_workdays(range, &self.holiday_dates);
        let office_days = present_days(range, self.attendance);

        Some(LastMonthProgress {
            month_name: last_day_of_last_month.format("%B").to_string(),
            year: last_day_of_last_month.year(),
            office_days,
            workdays,
            percentage: percentage(office_days, workdays),
        })
    }

    /// Builds the full report for a period.
    pub fn report(&self, period: Period, reference: NaiveDate, today: NaiveDate) -> PeriodReport {
        let current = period
            .is_current(reference, today)
            .then(|| self.current_progress(period, reference, today));
        let through_last_month = match period {
            Period::Quarterly => self.progress_through_last_month(reference, today),
            Period::Monthly | Period::Yearly => None,
        };

        PeriodReport {
            period,
            reference,
            target_rate: self.target,
            stats: self.period_stats(period, reference),
            current,
            through_last_month,
        }
    }

    /// Classifies a day for the calendar view.
    pub fn classify_day(&self, date: NaiveDate) -> DayStatus {
        if let Some(record) = self.attendance.get(date) {
            if record.present {
                return DayStatus::Present;
            }
            if !self.holidays.is_holiday(date) {
                return DayStatus::Absent;
            }
        }
        if self.holiday_dates.contains(&date) {
            DayStatus::Holiday
        } else if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            DayStatus::Weekend
        } else {
            DayStatus::Unreported
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::{AttendanceRecord, Holiday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
        DateWindow::new(start, end)
    }

    fn rate(p: u8) -> TargetRate {
        TargetRate::new(p).unwrap()
    }

    #[test]
    fn new_year_week_scenario() {
        let attendance = AttendanceLog::new(vec![AttendanceRecord::office(date(2024, 1, 2))]);
        let holidays =
            HolidayCalendar::new(vec![Holiday::public(date(2024, 1, 1), "New Year's Day")]);
        let calc = PeriodCalculator::new(&attendance, &holidays, rate(50));

        let stats = calc.window_stats(window(date(2024, 1, 1), date(2024, 1, 5)));
        assert_eq!(stats.total_workdays, 4);
        assert_eq!(stats.present_days, 1);
        assert_eq!(stats.required_days, 2);
        assert_eq!(stats.percentage, 50.0);
        assert_eq!(stats.days_still_needed(), 1);
        assert!(!stats.target_met());
    }

    #[test]
    fn workdays_without_holidays_are_weekdays() {
        let holidays = HolidayCalendar::default();
        // March 2024: 31 days, 10 weekend days.
        assert_eq!(
            total_workdays(window(date(2024, 3, 1), date(2024, 3, 31)), &holidays),
            21
        );
        // A weekend only.
        assert_eq!(
            total_workdays(window(date(2024, 3, 2), date(2024, 3, 3)), &holidays),
            0
        );
    }

    #[test]
    fn holidays_on_weekends_are_not_double_counted() {
        let holidays =
            HolidayCalendar::new(vec![Holiday::public(date(2024, 3, 17), "St. Patrick's Day")]);
        // 2024-03-17 is a Sunday.
        assert_eq!(
            total_workdays(window(date(2024, 3, 11), date(2024, 3, 17)), &holidays),
            5
        );
    }

    #[test]
    fn absent_records_and_out_of_window_records_do_not_count() {
        let mut attendance = AttendanceLog::default();
        attendance.set_presence(date(2024, 1, 2), false);
        attendance.upsert(AttendanceRecord::office(date(2024, 1, 3)));
        attendance.upsert(AttendanceRecord::office(date(2024, 2, 1)));

        assert_eq!(
            present_days(window(date(2024, 1, 1), date(2024, 1, 31)), &attendance),
            1
        );
    }

    #[test]
    fn required_days_example() {
        assert_eq!(rate(60).required_days(44), 27);
    }

    #[test]
    fn zero_required_days_gives_zero_percentage() {
        let attendance = AttendanceLog::default();
        let holidays = HolidayCalendar::default();
        let calc = PeriodCalculator::new(&attendance, &holidays, rate(50));
        let stats = calc.window_stats(window(date(2024, 3, 2), date(2024, 3, 3)));
        assert_eq!(stats.required_days, 0);
        assert_eq!(stats.percentage, 0.0);
    }

    #[test]
    fn current_progress_stops_at_today() {
        let attendance = AttendanceLog::new(vec![
            AttendanceRecord::office(date(2024, 3, 4)),
            AttendanceRecord::office(date(2024, 3, 5)),
            // Future record inside the month must be ignored.
            AttendanceRecord::office(date(2024, 3, 20)),
        ]);
        let holidays = HolidayCalendar::default();
        let calc = PeriodCalculator::new(&attendance, &holidays, rate(50));

        let progress = calc.current_progress(Period::Monthly, date(2024, 3, 1), date(2024, 3, 8));
        // 2024-03-01 (Fri) and 03-04..03-08 (Mon-Fri).
        assert_eq!(progress.workdays_so_far, 6);
        assert_eq!(progress.present_days, 2);
        assert!((progress.rate - 33.333).abs() < 0.01);
        assert_eq!(progress.window.unwrap().end, date(2024, 3, 8));
    }

    #[test]
    fn current_progress_before_period_start_is_empty() {
        let attendance = AttendanceLog::default();
        let holidays = HolidayCalendar::default();
        let calc = PeriodCalculator::new(&attendance, &holidays, rate(50));

        let progress = calc.current_progress(Period::Monthly, date(2024, 5, 1), date(2024, 4, 1));
        assert!(progress.window.is_none());
        assert_eq!(progress.workdays_so_far, 0);
        assert_eq!(progress.rate, 0.0);
    }

    #[test]
    fn last_month_progress_within_quarter() {
        let attendance = AttendanceLog::new(vec![
            AttendanceRecord::office(date(2024, 2, 1)),
            AttendanceRecord::office(date(2024, 3, 15)),
            AttendanceRecord::office(date(2024, 4, 2)),
        ]);
        let holidays = HolidayCalendar::default();
        let calc = PeriodCalculator::new(&attendance, &holidays, rate(50));

        let last = calc
            .progress_through_last_month(date(2024, 4, 10), date(2024, 4, 10))
            .unwrap();
        assert_eq!(last.month_name, "March");
        assert_eq!(last.year, 2024);
        assert_eq!(last.office_days, 2);
        // February 2024 has 21 workdays, March 21.
        assert_eq!(last.workdays, 42);
    }

    #[test]
    fn last_month_progress_absent_in_first_month_of_quarter() {
        let attendance = AttendanceLog::default();
        let holidays = HolidayCalendar::default();
        let calc = PeriodCalculator::new(&attendance, &holidays, rate(50));

        assert!(
            calc.progress_through_last_month(date(2024, 2, 10), date(2024, 2, 10))
                .is_none()
        );
    }

    #[test]
    fn last_month_progress_across_year_boundary() {
        let attendance = AttendanceLog::new(vec![AttendanceRecord::office(date(2024, 12, 2))]);
        let holidays = HolidayCalendar::default();
        let calc = PeriodCalculator::new(&attendance, &holidays, rate(50));

        let last = calc
            .progress_through_last_month(date(2025, 1, 15), date(2025, 1, 15))
            .unwrap();
        assert_eq!(last.month_name, "December");
        assert_eq!(last.year, 2024);
        assert_eq!(last.office_days, 1);
    }

    #[test]
    fn report_includes_current_progress_only_for_current_period() {
        let attendance = AttendanceLog::default();
        let holidays = HolidayCalendar::default();
        let calc = PeriodCalculator::new(&attendance, &holidays, rate(50));

        let current = calc.report(Period::Quarterly, date(2024, 3, 1), date(2024, 3, 20));
        assert!(current.current.is_some());
        assert!(current.through_last_month.is_some());

        let past = calc.report(Period::Monthly, date(2024, 1, 1), date(2024, 3, 20));
        assert!(past.current.is_none());
        assert!(past.through_last_month.is_none());
    }

    #[test]
    fn report_is_deterministic() {
        let attendance = AttendanceLog::new(vec![AttendanceRecord::office(date(2024, 3, 4))]);
        let holidays = HolidayCalendar::with_public_holidays();
        let calc = PeriodCalculator::new(&attendance, &holidays, rate(60));

        let a = calc.report(Period::Yearly, date(2024, 6, 1), date(2024, 6, 1));
        let b = calc.report(Period::Yearly, date(2024, 6, 1), date(2024, 6, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn classify_days() {
        let mut attendance = AttendanceLog::new(vec![AttendanceRecord::office(date(2024, 1, 1))]);
        attendance.set_presence(date(2024, 1, 3), false);
        let holidays = HolidayCalendar::new(vec![
            Holiday::public(date(2024, 1, 1), "New Year's Day"),
            Holiday::personal(date(2024, 1, 4), "Day off"),
        ]);
        let calc = PeriodCalculator::new(&attendance, &holidays, rate(50));

        assert_eq!(calc.classify_day(date(2024, 1, 1)), DayStatus::Present);
        assert_eq!(calc.classify_day(date(2024, 1, 2)), DayStatus::Unreported);
        assert_eq!(calc.classify_day(date(2024, 1, 3)), DayStatus::Absent);
        assert_eq!(calc.classify_day(date(2024, 1, 4)), DayStatus::Holiday);
        assert_eq!(calc.classify_day(date(2024, 1, 6)), DayStatus::Weekend);
    }
}
