//! FILENAME: core/pivot-engine/src/format.rs
//! Display formatting for pivot cells and date-like source values.

use records::{to_date, CellValue};

use crate::definition::AggregationType;

/// Placeholder shown for null cells.
pub const NULL_CELL_TEXT: &str = "-";

/// Formats an aggregate for display.
///
/// Counts are rounded to whole numbers, averages always show two decimals,
/// and the remaining kinds show up to two. All use thousands separators.
pub fn format_cell_value(value: Option<f64>, aggregation: AggregationType) -> String {
    let Some(value) = value else {
        return NULL_CELL_TEXT.to_string();
    };

    match aggregation {
        AggregationType::Count => format_number((value + 0.5).floor(), 0, 0),
        AggregationType::Average => format_number(value, 2, 2),
        _ => format_number(value, 0, 2),
    }
}

/// Renders date-like values (serial numbers, date text) as `MM/DD/YYYY`.
/// Anything else is returned unchanged.
pub fn format_date_value(value: &CellValue) -> CellValue {
    match to_date(value) {
        Some(date) => CellValue::Text(date.format("%m/%d/%Y").to_string()),
        None => value.clone(),
    }
}

/// Fixed-point formatting with grouped integer digits.
pub fn format_number(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (rounded.as_str(), ""),
    };

    let mut fraction = frac_part.trim_end_matches('0').to_string();
    while fraction.len() < min_fraction {
        fraction.push('0');
    }

    let is_zero = int_part.bytes().all(|b| b == b'0') && fraction.bytes().all(|b| b == b'0');
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(&fraction);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
