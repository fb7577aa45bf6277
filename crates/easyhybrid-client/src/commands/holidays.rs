//! Holiday commands.

use chrono::Datelike;

use easyhybrid_core::{DEFAULT_PERSONAL_HOLIDAY_NAME, Holiday, HolidayType};

use crate::app::App;
use crate::error::ClientResult;

/// Adds a personal holiday.
pub async fn add(app: &mut App, date: &str, name: Option<String>) -> ClientResult<()> {
    let date = app.date_or_today(Some(date))?;
    let name = name.unwrap_or_else(|| DEFAULT_PERSONAL_HOLIDAY_NAME.to_string());

    let mut holidays = app.store().load_holidays()?;
    holidays.add_personal(date, name.as_str());
    app.store().save_holidays(&holidays)?;

    println!("{}: {} added", date, name);
    app.data_changed().await;
    Ok(())
}

/// Removes every holiday on a date.
pub async fn remove(app: &mut App, date: &str) -> ClientResult<()> {
    let date = app.date_or_today(Some(date))?;
    let mut holidays = app.store().load_holidays()?;
    let removed = holidays.remove(date);
    if removed == 0 {
        println!("{}: no holiday", date);
        return Ok(());
    }
    app.store().save_holidays(&holidays)?;

    println!("{}: {} holiday(s) removed", date, removed);
    app.data_changed().await;
    Ok(())
}

/// Clears the holidays on a date, or adds a personal one.
pub async fn toggle(app: &mut App, date: &str) -> ClientResult<()> {
    let date = app.date_or_today(Some(date))?;
    let mut holidays = app.store().load_holidays()?;
    let added = holidays.toggle_personal(date);
    app.store().save_holidays(&holidays)?;

    if added {
        println!("{}: {} added", date, DEFAULT_PERSONAL_HOLIDAY_NAME);
    } else {
        println!("{}: holiday removed", date);
    }
    app.data_changed().await;
    Ok(())
}

/// Lists holidays, optionally for one year.
pub fn list(app: &App, year: Option<i32>) -> ClientResult<()> {
    let holidays = app.store().load_holidays()?;
    let mut selected: Vec<&Holiday> = holidays
        .iter()
        .filter(|h| year.is_none_or(|y| h.date.year() == y))
        .collect();
    selected.sort_by_key(|h| h.date);

    if selected.is_empty() {
        println!("No holidays.");
        return Ok(());
    }
    for holiday in selected {
        println!("{}", format_holiday(holiday));
    }
    Ok(())
}

fn format_holiday(holiday: &Holiday) -> String {
    let kind = match holiday.kind {
        HolidayType::Public => "public",
        HolidayType::Personal => "personal",
    };
    format!(
        "{}  {:<3}  {:<8}  {}",
        holiday.date,
        holiday.date.format("%a").to_string(),
        kind,
        holiday.name
    )
}
