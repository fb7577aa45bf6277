//! Export and import.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use easyhybrid_core::{ExportDocument, default_export_file_name};

use crate::app::App;
use crate::error::ClientResult;

/// Writes attendance, personal holidays and target to a JSON file.
///
/// Returns the path written.
pub fn export(app: &App, output: Option<PathBuf>) -> ClientResult<PathBuf> {
    let path = output.unwrap_or_else(|| PathBuf::from(default_export_file_name(app.today())));
    let data = app.store().load_user_data()?;
    let content = ExportDocument::from_user_data(&data, Utc::now()).to_json()?;
    std::fs::write(&path, content)?;

    info!(path = %path.display(), "exported data");
    println!("Exported {} record(s) to {}", data.attendance.len(), path.display());
    Ok(path)
}

/// Replaces local data with the content of an exported file.
///
/// Public holidays come from the built-in table, not from the file.
pub async fn import(app: &mut App, path: &Path) -> ClientResult<()> {
    let content = std::fs::read_to_string(path)?;
    let data = ExportDocument::from_json(&content)?.into_user_data();
    app.store().save_user_data(&data)?;

    info!(path = %path.display(), "imported data");
    println!(
        "Imported {} record(s) and {} personal holiday(s), target {}",
        data.attendance.len(),
        data.holidays.personal().count(),
        data.target_rate
    );
    app.data_changed().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{app, date};
    use easyhybrid_core::{AttendanceRecord, TargetRate};

    #[tokio::test]
    async fn export_then_import_into_fresh_store() {
        let src = tempfile::tempdir().unwrap();
        let (source, _) = app(&src, date(2024, 3, 4));
        let mut data = source.store().load_user_data().unwrap();
        data.attendance.upsert(AttendanceRecord::office(date(2024, 3, 4)));
        data.holidays.add_personal(date(2024, 3, 8), "Day off");
        data.target_rate = TargetRate::new(40).unwrap();
        source.store().save_user_data(&data).unwrap();

        let out = src.path().join("export.json");
        assert_eq!(export(&source, Some(out.clone())).unwrap(), out);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["holidays"].as_array().unwrap().len(), 1);
        assert_eq!(written["targetRate"], 40);

        let dst = tempfile::tempdir().unwrap();
        let (mut target, _) = app(&dst, date(2024, 3, 4));
        import(&mut target, &out).await.unwrap();

        let imported = target.store().load_user_data().unwrap();
        assert_eq!(imported.attendance, data.attendance);
        assert_eq!(imported.target_rate.percent(), 40);
        assert!(imported.holidays.is_holiday(date(2024, 3, 8)));
        assert!(imported.holidays.is_holiday(date(2024, 12, 25)));
    }

    #[tokio::test]
    async fn import_rejects_invalid_json_and_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app(&dir, date(2024, 3, 4));
        let mut log = app.store().load_attendance().unwrap();
        log.upsert(AttendanceRecord::office(date(2024, 3, 4)));
        app.store().save_attendance(&log).unwrap();

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ nope").unwrap();
        assert!(import(&mut app, &bad).await.is_err());
        assert_eq!(app.store().load_attendance().unwrap().len(), 1);
    }
}
