//! Core types: attendance, holidays, periods, statistics, local store

pub mod attendance;
pub mod error;
pub mod holidays;
pub mod period;
pub mod secret;
pub mod stats;
pub mod store;
pub mod tracing;
pub mod transfer;

pub use attendance::{
    AttendanceLog, AttendanceRecord, AttendanceType, DEFAULT_PERSONAL_HOLIDAY_NAME, Holiday,
    HolidayCalendar, HolidayType, TargetRate,
};
pub use error::{CoreError, CoreResult};
pub use period::{DateWindow, FiscalQuarter, Period, parse_date, quarter_window};
pub use stats::{
    CurrentProgress, DayStatus, LastMonthProgress, PeriodCalculator, PeriodReport, PeriodStats,
    is_workday, percentage, present_days, total_workdays,
};
pub use store::{LocalStore, UserData, Visibility};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use transfer::{ExportDocument, default_export_file_name};
