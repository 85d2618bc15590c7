//! FILENAME: core/records/src/date.rs
//! PURPOSE: Converts record values that represent dates into calendar dates.
//! CONTEXT: Spreadsheet exports carry dates either as serial day counts or as
//! formatted text. All conversions are UTC calendar dates; failures return
//! `None` and never raise.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use crate::cell::CellValue;

/// Serial numbers strictly between these bounds are treated as dates
/// (roughly 1968-06-12 to 2036-11-21).
pub const SERIAL_DATE_MIN: f64 = 25000.0;
pub const SERIAL_DATE_MAX: f64 = 50000.0;

/// Date-time layouts tried before the date-only layouts.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%a %b %d %Y",
    "%A, %B %d, %Y",
];

/// Serial day 0 of the spreadsheet date system.
fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// True when the value coerces to a number inside the serial-date window.
pub fn is_serial_date(value: &CellValue) -> bool {
    value
        .as_number()
        .is_some_and(|n| n > SERIAL_DATE_MIN && n < SERIAL_DATE_MAX)
}

/// Converts a serial day count to a date. Fractional days (time of day) are
/// truncated.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = TimeDelta::try_days(serial.trunc() as i64)?;
    serial_epoch()?.checked_add_signed(days)
}

/// Parses date text in the common ISO, US and long-month layouts, plus
/// RFC 3339 and RFC 2822 timestamps.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// True when the value is text that parses as a date.
pub fn is_date_text(value: &CellValue) -> bool {
    match value {
        CellValue::Text(s) => parse_date_text(s).is_some(),
        _ => false,
    }
}

/// Resolves a record value to a calendar date: serial numbers first, then
/// date text. Anything else is not a date.
pub fn to_date(value: &CellValue) -> Option<NaiveDate> {
    if is_serial_date(value) {
        return value.as_number().and_then(serial_to_date);
    }
    match value {
        CellValue::Text(s) => parse_date_text(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_serial_conversion() {
        assert_eq!(serial_to_date(45000.0), Some(ymd(2023, 3, 15)));
        assert_eq!(serial_to_date(45000.75), Some(ymd(2023, 3, 15)));
        assert_eq!(serial_to_date(0.0), Some(ymd(1899, 12, 30)));
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_serial_window_is_exclusive() {
        assert!(is_serial_date(&CellValue::Number(45000.0)));
        assert!(is_serial_date(&CellValue::text("45000")));
        assert!(!is_serial_date(&CellValue::Number(25000.0)));
        assert!(!is_serial_date(&CellValue::Number(50000.0)));
        assert!(!is_serial_date(&CellValue::Number(12.0)));
    }

    #[test]
    fn test_parse_date_text_layouts() {
        assert_eq!(parse_date_text("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_text("2024-01-15T10:30:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_text("2024-01-15T23:30:00-05:00"), Some(ymd(2024, 1, 16)));
        assert_eq!(parse_date_text("01/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_text("1/5/2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date_text("Jan 15, 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_text("15 March 2024"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date_text("hello"), None);
        assert_eq!(parse_date_text("42"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn test_to_date_rejects_plain_numbers() {
        assert_eq!(to_date(&CellValue::Number(100.0)), None);
        assert_eq!(to_date(&CellValue::Boolean(true)), None);
        assert_eq!(to_date(&CellValue::Empty), None);
        assert_eq!(to_date(&CellValue::Number(45000.0)), Some(ymd(2023, 3, 15)));
    }
}
