//! JSON export and import of user data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::attendance::{AttendanceLog, Holiday, HolidayCalendar, TargetRate};
use crate::error::{CoreError, CoreResult};
use crate::store::UserData;

/// Exported file layout. Only personal holidays are written out, public
/// ones are regenerated from the built-in table on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub attendance: AttendanceLog,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub target_rate: Option<TargetRate>,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
}

impl ExportDocument {
    /// Builds an export of `data` stamped with `now`.
    pub fn from_user_data(data: &UserData, now: DateTime<Utc>) -> Self {
        Self {
            attendance: data.attendance.clone(),
            holidays: data.holidays.personal().cloned().collect(),
            target_rate: Some(data.target_rate),
            export_date: Some(now),
        }
    }

    /// Converts an imported document into user data.
    ///
    /// Public holidays in the file are dropped and replaced by the built-in
    /// table; a missing target falls back to the default.
    pub fn into_user_data(self) -> UserData {
        let mut holidays = HolidayCalendar::with_public_holidays().holidays().to_vec();
        holidays.extend(self.holidays.into_iter().filter(Holiday::is_personal));

        UserData {
            attendance: self.attendance,
            holidays: HolidayCalendar::new(holidays),
            target_rate: self.target_rate.unwrap_or_default(),
        }
    }

    /// Serializes with two-space indentation.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::json("export", e))
    }

    /// Parses an exported file.
    pub fn from_json(content: &str) -> CoreResult<Self> {
        serde_json::from_str(content).map_err(|e| CoreError::json("import", e))
    }
}

/// Default export file name for the given day.
pub fn default_export_file_name(today: NaiveDate) -> String {
    format!("attendance-data-{}.json", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::AttendanceRecord;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> UserData {
        let mut holidays = HolidayCalendar::with_public_holidays();
        holidays.add_personal(date(2024, 7, 5), "Wedding");
        UserData {
            attendance: AttendanceLog::new(vec![AttendanceRecord::office(date(2024, 7, 1))]),
            holidays,
            target_rate: TargetRate::new(40).unwrap(),
        }
    }

    #[test]
    fn export_keeps_only_personal_holidays() {
        let now = Utc.with_ymd_and_hms(2024, 7, 10, 9, 0, 0).unwrap();
        let doc = ExportDocument::from_user_data(&sample(), now);

        assert_eq!(doc.holidays.len(), 1);
        assert_eq!(doc.holidays[0].name, "Wedding");

        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(json["targetRate"], 40);
        assert_eq!(json["exportDate"], "2024-07-10T09:00:00Z");
        assert_eq!(json["attendance"][0]["date"], "2024-07-01");
    }

    #[test]
    fn export_then_import_restores_data() {
        let data = sample();
        let doc = ExportDocument::from_user_data(&data, Utc::now());
        let imported = ExportDocument::from_json(&doc.to_json().unwrap())
            .unwrap()
            .into_user_data();

        assert_eq!(imported.attendance, data.attendance);
        assert_eq!(imported.target_rate, data.target_rate);
        assert_eq!(imported.holidays.len(), data.holidays.len());
    }

    #[test]
    fn import_drops_public_holidays_and_defaults_target() {
        let content = r#"{
            "attendance": [{"date": "2024-02-05", "present": true, "type": "office"}],
            "holidays": [
                {"date": "2024-02-09", "name": "Bogus", "type": "public"},
                {"date": "2024-02-12", "name": "Dentist", "type": "personal"}
            ]
        }"#;

        let data = ExportDocument::from_json(content).unwrap().into_user_data();
        assert_eq!(data.target_rate, TargetRate::default());
        assert!(!data.holidays.is_holiday(date(2024, 2, 9)));
        assert!(data.holidays.is_holiday(date(2024, 2, 12)));
        assert!(data.holidays.is_holiday(date(2024, 1, 1)));
        assert_eq!(data.attendance.len(), 1);
    }

    #[test]
    fn import_rejects_garbage() {
        assert!(ExportDocument::from_json("[]").is_err());
    }

    #[test]
    fn file_name_uses_iso_date() {
        assert_eq!(
            default_export_file_name(date(2024, 3, 9)),
            "attendance-data-2024-03-09.json"
        );
    }
}
