//! `YYYYMMDD` calendar date parsing and formatting.

use chrono::NaiveDate;

use crate::error::TodoError;

/// chrono format string for stored task dates.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Parse a strict `YYYYMMDD` date.
///
/// chrono's `%Y` accepts signed and variable-width years, so the shape is
/// checked first: exactly eight ASCII digits.
pub fn parse_date(raw: &str) -> Result<NaiveDate, TodoError> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TodoError::InvalidDate(format!(
            "'{raw}', expected YYYYMMDD"
        )));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| TodoError::InvalidDate(format!("'{raw}': {e}")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
