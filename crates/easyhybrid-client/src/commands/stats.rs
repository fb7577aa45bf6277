//! Statistics command.

use std::fmt::Write as _;

use easyhybrid_core::{Period, PeriodCalculator, PeriodReport};

use crate::app::App;
use crate::error::{ClientError, ClientResult};

/// Prints the report for the period containing `date` (default today).
pub fn stats(
    app: &App,
    period: Option<Period>,
    date: Option<&str>,
    json: bool,
) -> ClientResult<()> {
    let report = build_report(app, period, date)?;
    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| ClientError::Usage(format!("failed to encode report: {}", e)))?;
        println!("{}", out);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

fn build_report(
    app: &App,
    period: Option<Period>,
    date: Option<&str>,
) -> ClientResult<PeriodReport> {
    let period = period.unwrap_or(app.config().display.default_period);
    let reference = app.date_or_today(date)?;
    let data = app.store().load_user_data()?;
    let calculator = PeriodCalculator::new(&data.attendance, &data.holidays, data.target_rate);
    Ok(calculator.report(period, reference, app.today()))
}

/// Plain-text rendering of a report.
pub fn render_report(report: &PeriodReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {} ({})",
        capitalize(report.period.noun()),
        stats.window,
        report.period
    );
    let _ = writeln!(out, "  Target:          {}", report.target_rate);
    let _ = writeln!(out, "  Workdays:        {}", stats.total_workdays);
    let _ = writeln!(out, "  Required days:   {}", stats.required_days);
    let _ = writeln!(out, "  Office days:     {}", stats.present_days);
    let _ = writeln!(out, "  Of target:       {:.1}%", stats.percentage);

    if stats.target_met() {
        let _ = writeln!(out, "  Target met for this {}.", report.period.noun());
    } else {
        let _ = writeln!(
            out,
            "  {} more office day(s) needed this {}.",
            stats.days_still_needed(),
            report.period.noun()
        );
    }

    if let Some(ref current) = report.current {
        let _ = writeln!(
            out,
            "  So far:          {}/{} workdays ({:.1}%)",
            current.present_days, current.workdays_so_far, current.rate
        );
    }

    if let Some(ref last) = report.through_last_month {
        let _ = writeln!(
            out,
            "  Through {} {}: {}/{} workdays ({:.1}%)",
            last.month_name, last.year, last.office_days, last.workdays, last.percentage
        );
    }

    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
