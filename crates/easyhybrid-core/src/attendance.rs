//! Attendance records, holidays and the target rate.
//!
//! These are the three pieces of user data that are persisted locally,
//! exported, and mirrored to the remote document. Their JSON shape is shared
//! by all three, so field names follow the camel-case/`type` convention of the
//! stored documents rather than Rust naming.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

/// How a reported day was spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceType {
    /// Worked from the office.
    #[default]
    Office,
    /// Worked remotely.
    Remote,
    /// Did not work.
    Absent,
}

impl AttendanceType {
    /// Returns the lowercase name used in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Remote => "remote",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reported day.
///
/// Only `present` counts towards the office-attendance rate; `kind` records
/// what the user said about the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The calendar day.
    pub date: NaiveDate,
    /// Whether the user was in the office.
    pub present: bool,
    /// How the day was spent.
    #[serde(rename = "type", default)]
    pub kind: AttendanceType,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AttendanceRecord {
    /// Creates a record of the given kind. Only office days are present.
    pub fn new(date: NaiveDate, kind: AttendanceType) -> Self {
        Self {
            date,
            present: kind == AttendanceType::Office,
            kind,
            note: None,
        }
    }

    /// Creates an office (present) record.
    pub fn office(date: NaiveDate) -> Self {
        Self::new(date, AttendanceType::Office)
    }

    /// Builder: attach a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// The user's reported days, at most one per date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceLog {
    records: Vec<AttendanceRecord>,
}

impl AttendanceLog {
    /// Wraps existing records as-is.
    pub fn new(records: Vec<AttendanceRecord>) -> Self {
        Self { records }
    }

    /// Returns the records in insertion order.
    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record for a date, if reported.
    pub fn get(&self, date: NaiveDate) -> Option<&AttendanceRecord> {
        self.records.iter().find(|r| r.date == date)
    }

    /// Inserts a record, replacing any record for the same date.
    pub fn upsert(&mut self, record: AttendanceRecord) {
        match self.records.iter_mut().find(|r| r.date == record.date) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Removes the record for a date. Returns true if one was removed.
    pub fn remove(&mut self, date: NaiveDate) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.date != date);
        before != self.records.len()
    }

    /// Calendar click: removes the day if reported, otherwise adds an office day.
    ///
    /// Returns true if a record was added.
    pub fn toggle_office(&mut self, date: NaiveDate) -> bool {
        if self.remove(date) {
            false
        } else {
            self.records.push(AttendanceRecord::office(date));
            true
        }
    }

    /// Quick action: sets the presence flag for a date, creating the record if needed.
    pub fn set_presence(&mut self, date: NaiveDate, present: bool) {
        if let Some(existing) = self.records.iter_mut().find(|r| r.date == date) {
            existing.present = present;
            if !present {
                existing.kind = AttendanceType::Absent;
            } else if existing.kind == AttendanceType::Absent {
                existing.kind = AttendanceType::Office;
            }
            return;
        }

        let kind = if present {
            AttendanceType::Office
        } else {
            AttendanceType::Absent
        };
        self.records.push(AttendanceRecord::new(date, kind));
    }

    /// Iterates over the records.
    pub fn iter(&self) -> impl Iterator<Item = &AttendanceRecord> {
        self.records.iter()
    }
}

impl From<Vec<AttendanceRecord>> for AttendanceLog {
    fn from(records: Vec<AttendanceRecord>) -> Self {
        Self::new(records)
    }
}

/// Where a holiday comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayType {
    /// Seeded from the public holiday table.
    Public,
    /// Added by the user.
    Personal,
}

/// A non-working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The calendar day.
    pub date: NaiveDate,
    /// Display name.
    pub name: String,
    /// Public or personal.
    #[serde(rename = "type")]
    pub kind: HolidayType,
}

/// Name given to holidays added from the calendar without an explicit name.
pub const DEFAULT_PERSONAL_HOLIDAY_NAME: &str = "Personal Holiday";

impl Holiday {
    /// Creates a public holiday.
    pub fn public(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            kind: HolidayType::Public,
        }
    }

    /// Creates a personal holiday.
    pub fn personal(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            kind: HolidayType::Personal,
        }
    }

    /// Returns true for user-added holidays.
    pub fn is_personal(&self) -> bool {
        self.kind == HolidayType::Personal
    }
}

/// Public and personal holidays. Several holidays may share a date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidayCalendar {
    holidays: Vec<Holiday>,
}

impl HolidayCalendar {
    /// Wraps existing holidays as-is.
    pub fn new(holidays: Vec<Holiday>) -> Self {
        Self { holidays }
    }

    /// Creates a calendar holding only the public holiday table.
    pub fn with_public_holidays() -> Self {
        Self::new(crate::holidays::public_holidays())
    }

    /// Returns all holidays.
    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    /// Returns the number of holidays.
    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    /// Returns true if there are no holidays.
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    /// Returns true if any holiday falls on the date.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.iter().any(|h| h.date == date)
    }

    /// Returns the holidays on a date.
    pub fn on(&self, date: NaiveDate) -> impl Iterator<Item = &Holiday> {
        self.holidays.iter().filter(move |h| h.date == date)
    }

    /// Returns the set of holiday dates, for fast membership checks.
    pub fn dates(&self) -> HashSet<NaiveDate> {
        self.holidays.iter().map(|h| h.date).collect()
    }

    /// Returns the user-added holidays.
    pub fn personal(&self) -> impl Iterator<Item = &Holiday> {
        self.holidays.iter().filter(|h| h.is_personal())
    }

    /// Adds a personal holiday.
    pub fn add_personal(&mut self, date: NaiveDate, name: impl Into<String>) {
        self.holidays.push(Holiday::personal(date, name));
    }

    /// Removes every holiday on a date. Returns how many were removed.
    pub fn remove(&mut self, date: NaiveDate) -> usize {
        let before = self.holidays.len();
        self.holidays.retain(|h| h.date != date);
        before - self.holidays.len()
    }

    /// Calendar click: clears the date if it holds any holiday (public ones
    /// included), otherwise adds a personal holiday.
    ///
    /// Returns true if a holiday was added.
    pub fn toggle_personal(&mut self, date: NaiveDate) -> bool {
        if self.remove(date) > 0 {
            false
        } else {
            self.add_personal(date, DEFAULT_PERSONAL_HOLIDAY_NAME);
            true
        }
    }

    /// Iterates over the holidays.
    pub fn iter(&self) -> impl Iterator<Item = &Holiday> {
        self.holidays.iter()
    }
}

impl From<Vec<Holiday>> for HolidayCalendar {
    fn from(holidays: Vec<Holiday>) -> Self {
        Self::new(holidays)
    }
}

/// Percentage of workdays the user aims to spend in the office (1..=100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetRate(u8);

impl TargetRate {
    /// Rate used when nothing has been configured.
    pub const DEFAULT: TargetRate = TargetRate(50);

    /// Creates a target rate, rejecting values outside 1..=100.
    pub fn new(percent: u8) -> CoreResult<Self> {
        if (1..=100).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(CoreError::InvalidTarget(percent.to_string()))
        }
    }

    /// Accepts any number, rounding and clamping into 1..=100.
    ///
    /// Non-finite values fall back to the default.
    pub fn from_lenient(value: f64) -> Self {
        if !value.is_finite() {
            return Self::DEFAULT;
        }
        Self(value.round().clamp(1.0, 100.0) as u8)
    }

    /// Returns the percentage.
    pub fn percent(self) -> u8 {
        self.0
    }

    /// `ceil(workdays * rate / 100)`.
    pub fn required_days(self, workdays: u32) -> u32 {
        (workdays * u32::from(self.0)).div_ceil(100)
    }
}

impl Default for TargetRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for TargetRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for TargetRate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%');
        let percent: u8 = trimmed
            .parse()
            .map_err(|_| CoreError::InvalidTarget(s.to_string()))?;
        Self::new(percent)
    }
}

impl Serialize for TargetRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for TargetRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Self::from_lenient(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod records {
        use super::*;

        #[test]
        fn json_shape_uses_type_field() {
            let record = AttendanceRecord::office(date(2024, 1, 2));
            let json = serde_json::to_value(&record).unwrap();
            assert_eq!(
                json,
                serde_json::json!({"date": "2024-01-02", "present": true, "type": "office"})
            );
        }

        #[test]
        fn note_round_trips_when_present() {
            let json = r#"{"date":"2024-03-04","present":false,"type":"remote","note":"train strike"}"#;
            let record: AttendanceRecord = serde_json::from_str(json).unwrap();
            assert_eq!(record.kind, AttendanceType::Remote);
            assert_eq!(record.note.as_deref(), Some("train strike"));
            assert!(!record.present);
        }

        #[test]
        fn only_office_days_are_present() {
            assert!(AttendanceRecord::new(date(2024, 1, 2), AttendanceType::Office).present);
            assert!(!AttendanceRecord::new(date(2024, 1, 2), AttendanceType::Remote).present);
            assert!(!AttendanceRecord::new(date(2024, 1, 2), AttendanceType::Absent).present);
        }

        #[test]
        fn toggle_adds_then_removes() {
            let mut log = AttendanceLog::default();
            assert!(log.toggle_office(date(2024, 5, 6)));
            assert_eq!(log.len(), 1);
            assert!(log.get(date(2024, 5, 6)).unwrap().present);

            assert!(!log.toggle_office(date(2024, 5, 6)));
            assert!(log.is_empty());
        }

        #[test]
        fn upsert_keeps_one_record_per_date() {
            let mut log = AttendanceLog::default();
            log.upsert(AttendanceRecord::office(date(2024, 5, 6)));
            log.upsert(AttendanceRecord::new(date(2024, 5, 6), AttendanceType::Remote));
            assert_eq!(log.len(), 1);
            assert_eq!(log.get(date(2024, 5, 6)).unwrap().kind, AttendanceType::Remote);
        }

        #[test]
        fn set_presence_updates_existing_record() {
            let mut log = AttendanceLog::default();
            log.set_presence(date(2024, 5, 6), true);
            log.set_presence(date(2024, 5, 6), false);

            let record = log.get(date(2024, 5, 6)).unwrap();
            assert_eq!(log.len(), 1);
            assert!(!record.present);
            assert_eq!(record.kind, AttendanceType::Absent);

            log.set_presence(date(2024, 5, 6), true);
            assert_eq!(log.get(date(2024, 5, 6)).unwrap().kind, AttendanceType::Office);
        }

        #[test]
        fn log_serializes_as_plain_array() {
            let log = AttendanceLog::new(vec![AttendanceRecord::office(date(2024, 1, 2))]);
            let json = serde_json::to_string(&log).unwrap();
            assert!(json.starts_with('['));
        }
    }

    mod holidays {
        use super::*;

        #[test]
        fn toggle_removes_public_holiday_too() {
            let mut calendar =
                HolidayCalendar::new(vec![Holiday::public(date(2024, 1, 1), "New Year's Day")]);
            assert!(!calendar.toggle_personal(date(2024, 1, 1)));
            assert!(calendar.is_empty());

            assert!(calendar.toggle_personal(date(2024, 1, 1)));
            let added: Vec<_> = calendar.on(date(2024, 1, 1)).collect();
            assert_eq!(added.len(), 1);
            assert_eq!(added[0].name, DEFAULT_PERSONAL_HOLIDAY_NAME);
            assert!(added[0].is_personal());
        }

        #[test]
        fn duplicates_on_a_date_are_allowed() {
            let mut calendar = HolidayCalendar::default();
            calendar.add_personal(date(2024, 7, 1), "Trip");
            calendar.add_personal(date(2024, 7, 1), "Trip again");
            assert_eq!(calendar.len(), 2);
            assert_eq!(calendar.dates().len(), 1);
            assert_eq!(calendar.remove(date(2024, 7, 1)), 2);
        }

        #[test]
        fn personal_filter() {
            let calendar = HolidayCalendar::new(vec![
                Holiday::public(date(2024, 1, 1), "New Year's Day"),
                Holiday::personal(date(2024, 7, 1), "Trip"),
            ]);
            let personal: Vec<_> = calendar.personal().collect();
            assert_eq!(personal.len(), 1);
            assert_eq!(personal[0].name, "Trip");
        }
    }

    mod target_rate {
        use super::*;

        #[test]
        fn required_days_rounds_up() {
            let rate = TargetRate::new(60).unwrap();
            assert_eq!(rate.required_days(44), 27);
            assert_eq!(TargetRate::new(50).unwrap().required_days(4), 2);
            assert_eq!(TargetRate::new(100).unwrap().required_days(0), 0);
        }

        #[test]
        fn rejects_out_of_range() {
            assert!(TargetRate::new(0).is_err());
            assert!(TargetRate::new(101).is_err());
            assert!("abc".parse::<TargetRate>().is_err());
            assert_eq!("60%".parse::<TargetRate>().unwrap().percent(), 60);
        }

        #[test]
        fn lenient_deserialization_clamps() {
            let rate: TargetRate = serde_json::from_str("0.6").unwrap();
            assert_eq!(rate.percent(), 1);
            let rate: TargetRate = serde_json::from_str("62.5").unwrap();
            assert_eq!(rate.percent(), 63);
            let rate: TargetRate = serde_json::from_str("250").unwrap();
            assert_eq!(rate.percent(), 100);
        }

        #[test]
        fn serializes_as_integer() {
            let rate = TargetRate::new(60).unwrap();
            assert_eq!(serde_json::to_string(&rate).unwrap(), "60");
        }
    }
}
