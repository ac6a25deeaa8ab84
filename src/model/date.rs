//! Calendar helpers shared by the ledger mapper: the fixed month-sheet name
//! table and the 1900-based day serial that spreadsheet cells use for dates.

use chrono::{Duration, NaiveDate};

/// Sheet titles of a yearly spreadsheet, indexed by 0-based calendar month.
pub const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// First day counted by the day serial.
fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).expect("1900-01-01 is a valid date")
}

/// Whole days elapsed since 1900-01-01.
pub(crate) fn days_since_epoch(date: NaiveDate) -> i64 {
    date.signed_duration_since(epoch()).num_days()
}

/// Converts a 1-based day serial back into a date. Serial 1 is 1900-01-01.
pub(crate) fn date_from_serial(serial: i64) -> NaiveDate {
    epoch() + Duration::days(serial - 1)
}

/// Maps a sheet title back to its 0-based calendar month.
pub(crate) fn month_from_sheet_title(title: &str) -> Option<u32> {
    MONTH_NAMES.iter().position(|m| *m == title).map(|i| i as u32)
}
