//! Attendance commands.

use easyhybrid_core::{AttendanceRecord, AttendanceType};
use tracing::debug;

use crate::app::App;
use crate::error::ClientResult;

/// Records a day, replacing any earlier record for the same date.
pub async fn mark(
    app: &mut App,
    date: Option<&str>,
    kind: AttendanceType,
    note: Option<String>,
) -> ClientResult<()> {
    let date = app.date_or_today(date)?;
    let mut record = AttendanceRecord::new(date, kind);
    if let Some(note) = note {
        record = record.with_note(note);
    }

    let mut log = app.store().load_attendance()?;
    log.upsert(record);
    app.store().save_attendance(&log)?;
    debug!(%date, %kind, "marked day");

    println!("{}: {}", date, kind);
    app.data_changed().await;
    Ok(())
}

/// Adds an office day, or clears the day if it already has a record.
pub async fn toggle(app: &mut App, date: &str) -> ClientResult<()> {
    let date = app.date_or_today(Some(date))?;
    let mut log = app.store().load_attendance()?;
    let added = log.toggle_office(date);
    app.store().save_attendance(&log)?;

    if added {
        println!("{}: office", date);
    } else {
        println!("{}: cleared", date);
    }
    app.data_changed().await;
    Ok(())
}

/// Removes the record for a day.
pub async fn unmark(app: &mut App, date: &str) -> ClientResult<()> {
    let date = app.date_or_today(Some(date))?;
    let mut log = app.store().load_attendance()?;
    if !log.remove(date) {
        println!("{}: nothing recorded", date);
        return Ok(());
    }
    app.store().save_attendance(&log)?;

    println!("{}: cleared", date);
    app.data_changed().await;
    Ok(())
}

/// Quick action for today: present, or absent with `absent`.
pub async fn today(app: &mut App, absent: bool) -> ClientResult<()> {
    let today = app.today();
    let mut log = app.store().load_attendance()?;
    log.set_presence(today, !absent);
    app.store().save_attendance(&log)?;

    let label = if absent { "absent" } else { "present" };
    println!("{}: {}", today, label);
    app.data_changed().await;
    Ok(())
}
