//! Public holiday table.
//!
//! Irish public holidays for 2024 through 2030. These seed the holiday
//! calendar on first run and are regenerated on every import; they are never
//! read back from imported files.

use chrono::{Datelike, NaiveDate};

use crate::attendance::Holiday;

/// First year covered by the table.
pub const FIRST_YEAR: i32 = 2024;
/// Last year covered by the table.
pub const LAST_YEAR: i32 = 2030;

const IRISH_PUBLIC_HOLIDAYS: &[(i32, u32, u32, &str)] = &[
    (2024, 1, 1, "New Year's Day"),
    (2024, 2, 5, "St. Brigid's Day"),
    (2024, 3, 17, "St. Patrick's Day"),
    (2024, 4, 1, "Easter Monday"),
    (2024, 5, 6, "May Bank Holiday"),
    (2024, 6, 3, "June Bank Holiday"),
    (2024, 8, 5, "August Bank Holiday"),
    (2024, 10, 28, "October Bank Holiday"),
    (2024, 12, 25, "Christmas Day"),
    (2024, 12, 26, "St. Stephen's Day"),
    (2025, 1, 1, "New Year's Day"),
    (2025, 2, 5, "St. Brigid's Day"),
    (2025, 3, 17, "St. Patrick's Day"),
    (2025, 4, 21, "Easter Monday"),
    (2025, 5, 5, "May Bank Holiday"),
    (2025, 6, 2, "June Bank Holiday"),
    (2025, 8, 4, "August Bank Holiday"),
    (2025, 10, 27, "October Bank Holiday"),
    (2025, 12, 25, "Christmas Day"),
    (2025, 12, 26, "St. Stephen's Day"),
    (2026, 1, 1, "New Year's Day"),
    (2026, 2, 5, "St. Brigid's Day"),
    (2026, 3, 17, "St. Patrick's Day"),
    (2026, 4, 6, "Easter Monday"),
    (2026, 5, 4, "May Bank Holiday"),
    (2026, 6, 1, "June Bank Holiday"),
    (2026, 8, 3, "August Bank Holiday"),
    (2026, 10, 26, "October Bank Holiday"),
    (2026, 12, 25, "Christmas Day"),
    (2026, 12, 26, "St. Stephen's Day"),
    (2027, 1, 1, "New Year's Day"),
    (2027, 2, 5, "St. Brigid's Day"),
    (2027, 3, 17, "St. Patrick's Day"),
    (2027, 3, 29, "Easter Monday"),
    (2027, 5, 3, "May Bank Holiday"),
    (2027, 6, 7, "June Bank Holiday"),
    (2027, 8, 2, "August Bank Holiday"),
    (2027, 10, 25, "October Bank Holiday"),
    (2027, 12, 25, "Christmas Day"),
    (2027, 12, 26, "St. Stephen's Day"),
    (2028, 1, 1, "New Year's Day"),
    (2028, 2, 5, "St. Brigid's Day"),
    (2028, 3, 17, "St. Patrick's Day"),
    (2028, 4, 17, "Easter Monday"),
    (2028, 5, 1, "May Bank Holiday"),
    (2028, 6, 5, "June Bank Holiday"),
    (2028, 8, 7, "August Bank Holiday"),
    (2028, 10, 30, "October Bank Holiday"),
    (2028, 12, 25, "Christmas Day"),
    (2028, 12, 26, "St. Stephen's Day"),
    (2029, 1, 1, "New Year's Day"),
    (2029, 2, 5, "St. Brigid's Day"),
    (2029, 3, 17, "St. Patrick's Day"),
    (2029, 4, 2, "Easter Monday"),
    (2029, 5, 7, "May Bank Holiday"),
    (2029, 6, 4, "June Bank Holiday"),
    (2029, 8, 6, "August Bank Holiday"),
    (2029, 10, 29, "October Bank Holiday"),
    (2029, 12, 25, "Christmas Day"),
    (2029, 12, 26, "St. Stephen's Day"),
    (2030, 1, 1, "New Year's Day"),
    (2030, 2, 5, "St. Brigid's Day"),
    (2030, 3, 17, "St. Patrick's Day"),
    (2030, 4, 22, "Easter Monday"),
    (2030, 5, 6, "May Bank Holiday"),
    (2030, 6, 3, "June Bank Holiday"),
    (2030, 8, 5, "August Bank Holiday"),
    (2030, 10, 28, "October Bank Holiday"),
    (2030, 12, 25, "Christmas Day"),
    (2030, 12, 26, "St. Stephen's Day"),
];

/// Returns the public holidays of every covered year.
pub fn public_holidays() -> Vec<Holiday> {
    IRISH_PUBLIC_HOLIDAYS
        .iter()
        .filter_map(|&(y, m, d, name)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|date| Holiday::public(date, name))
        })
        .collect()
}

/// Returns the public holidays of one year (empty outside the covered range).
pub fn public_holidays_in(year: i32) -> Vec<Holiday> {
    public_holidays()
        .into_iter()
        .filter(|h| h.date.year() == year)
        .collect()
}
