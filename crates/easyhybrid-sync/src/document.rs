//! The document stored in the backup gist.

use chrono::{DateTime, Utc};
use easyhybrid_core::{AttendanceLog, HolidayCalendar, TargetRate, UserData};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Description used both to find and to create the backup gist.
pub const GIST_DESCRIPTION: &str = "Easy Hybrid Office Attendance Data";

/// File name of the document inside the gist.
pub const GIST_FILENAME: &str = "easy-hybrid-attendance.json";

/// Format tag written into every document.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Full snapshot of user data, replaced wholesale on every backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GistDocument {
    pub attendance: AttendanceLog,
    pub holidays: HolidayCalendar,
    #[serde(default)]
    pub target_rate: TargetRate,
    pub last_modified: DateTime<Utc>,
    pub version: String,
}

impl GistDocument {
    pub fn from_user_data(data: &UserData, now: DateTime<Utc>) -> Self {
        Self {
            attendance: data.attendance.clone(),
            holidays: data.holidays.clone(),
            target_rate: data.target_rate,
            last_modified: now,
            version: DOCUMENT_VERSION.to_string(),
        }
    }

    /// Seed for a freshly created gist: no records, no holidays, default target.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self::from_user_data(
            &UserData {
                attendance: AttendanceLog::default(),
                holidays: HolidayCalendar::default(),
                target_rate: TargetRate::default(),
            },
            now,
        )
    }

    pub fn into_user_data(self) -> UserData {
        UserData {
            attendance: self.attendance,
            holidays: self.holidays,
            target_rate: self.target_rate,
        }
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json(&self) -> SyncResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SyncError::internal(format!("failed to encode document: {}", e)))
    }

    pub fn from_json(content: &str) -> SyncResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| SyncError::parse(format!("invalid gist document: {}", e)).with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use easyhybrid_core::{AttendanceRecord, Holiday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> UserData {
        UserData {
            attendance: AttendanceLog::new(vec![
                AttendanceRecord::office(date(2024, 3, 4)),
                AttendanceRecord::office(date(2024, 3, 5)).with_note("offsite"),
            ]),
            holidays: HolidayCalendar::new(vec![
                Holiday::public(date(2024, 3, 18), "St. Patrick's Day (observed)"),
                Holiday::personal(date(2024, 3, 22), "Personal Holiday"),
            ]),
            target_rate: TargetRate::new(60).unwrap(),
        }
    }

    #[test]
    fn document_shape() {
        let doc = GistDocument::from_user_data(&sample(), Utc::now());
        insta::assert_json_snapshot!("gist_document_shape", doc, {
            ".lastModified" => "[timestamp]",
        });
    }

    #[test]
    fn unchanged_data_differs_only_in_timestamp() {
        let first = GistDocument::from_user_data(
            &sample(),
            Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap(),
        );
        let second = GistDocument::from_user_data(
            &sample(),
            Utc.with_ymd_and_hms(2024, 3, 6, 9, 30, 0).unwrap(),
        );

        let mut a: serde_json::Value = serde_json::from_str(&first.to_json().unwrap()).unwrap();
        let mut b: serde_json::Value = serde_json::from_str(&second.to_json().unwrap()).unwrap();
        assert_ne!(a["lastModified"], b["lastModified"]);
        a["lastModified"] = serde_json::Value::Null;
        b["lastModified"] = serde_json::Value::Null;
        assert_eq!(a, b);
    }

    #[test]
    fn empty_document_uses_default_target() {
        let doc = GistDocument::empty(Utc::now());
        assert!(doc.attendance.is_empty());
        assert!(doc.holidays.is_empty());
        assert_eq!(doc.target_rate.percent(), 50);
        assert_eq!(doc.version, DOCUMENT_VERSION);
    }

    #[test]
    fn fractional_target_from_older_documents() {
        let content = r#"{
            "attendance": [],
            "holidays": [],
            "targetRate": 0.6,
            "lastModified": "2024-01-01T00:00:00.000Z",
            "version": "1.0"
        }"#;
        let doc = GistDocument::from_json(content).unwrap();
        assert_eq!(doc.target_rate.percent(), 1);
    }

    #[test]
    fn invalid_document_is_parse_error() {
        let err = GistDocument::from_json("{\"attendance\": 3}").unwrap_err();
        assert_eq!(err.code(), crate::error::SyncErrorCode::ParseError);
    }
}
