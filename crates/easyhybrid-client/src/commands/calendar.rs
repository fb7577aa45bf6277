//! Month calendar view.

use std::fmt::Write as _;

use chrono::{Datelike, NaiveDate};

use easyhybrid_core::{DateWindow, DayStatus, PeriodCalculator};

use crate::app::App;
use crate::error::{ClientError, ClientResult};

/// Prints the month containing `month` (`YYYY-MM`, default this month).
pub fn calendar(app: &App, month: Option<&str>) -> ClientResult<()> {
    let first = match month {
        Some(m) => parse_month(m)?,
        None => app.today().with_day(1).unwrap_or(app.today()),
    };
    let data = app.store().load_user_data()?;
    let calculator = PeriodCalculator::new(&data.attendance, &data.holidays, data.target_rate);
    print!("{}", render_month(&calculator, first, app.today()));
    Ok(())
}

fn parse_month(s: &str) -> ClientResult<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|_| ClientError::Usage(format!("invalid month '{}', expected YYYY-MM", s)))
}

fn marker(status: DayStatus) -> char {
    match status {
        DayStatus::Present => '*',
        DayStatus::Absent => '-',
        DayStatus::Holiday => 'h',
        DayStatus::Weekend | DayStatus::Unreported => ' ',
    }
}

/// Renders a Monday-first month grid followed by the month's figures.
///
/// Each day is its number and a marker: `*` office, `-` not present,
/// `h` holiday. Today is wrapped in brackets.
pub fn render_month(
    calculator: &PeriodCalculator<'_>,
    first: NaiveDate,
    today: NaiveDate,
) -> String {
    let window = DateWindow::month_of(first);
    let mut out = String::new();

    let _ = writeln!(out, "{:^35}", first.format("%B %Y").to_string());
    let _ = writeln!(out, " Mon  Tue  Wed  Thu  Fri  Sat  Sun");

    let offset = window.start.weekday().num_days_from_monday() as usize;
    let mut line = "     ".repeat(offset);
    for day in window.days() {
        let cell = format!("{:>2}{}", day.day(), marker(calculator.classify_day(day)));
        if day == today {
            let _ = write!(line, "[{}]", cell);
        } else {
            let _ = write!(line, " {} ", cell);
        }
        if day.weekday().num_days_from_monday() == 6 {
            let _ = writeln!(out, "{}", line.trim_end());
            line.clear();
        }
    }
    if !line.is_empty() {
        let _ = writeln!(out, "{}", line.trim_end());
    }

    let stats = calculator.window_stats(window);
    let _ = writeln!(
        out,
        "\n* office  - not present  h holiday\n{} office day(s) of {} required, {} workdays",
        stats.present_days, stats.required_days, stats.total_workdays
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::date;
    use easyhybrid_core::{
        AttendanceLog, AttendanceRecord, AttendanceType, Holiday, HolidayCalendar, TargetRate,
    };

    #[test]
    fn renders_markers_and_summary() {
        let attendance = AttendanceLog::new(vec![
            AttendanceRecord::office(date(2024, 1, 2)),
            AttendanceRecord::new(date(2024, 1, 3), AttendanceType::Remote),
        ]);
        let holidays =
            HolidayCalendar::new(vec![Holiday::public(date(2024, 1, 1), "New Year's Day")]);
        let calculator = PeriodCalculator::new(&attendance, &holidays, TargetRate::DEFAULT);

        let out = render_month(&calculator, date(2024, 1, 1), date(2024, 1, 4));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0].trim(), "January 2024");
        // January 2024 starts on a Monday.
        assert_eq!(lines[2], "  1h   2*   3- [ 4 ]  5    6    7");
        assert!(out.contains("1 office day(s) of 11 required, 22 workdays"));
    }

    #[test]
    fn month_argument_is_validated() {
        assert_eq!(parse_month("2024-02").unwrap(), date(2024, 2, 1));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("Feb").is_err());
    }
}
