//! FILENAME: core/records/src/cell.rs
//! PURPOSE: Defines the scalar value held by one field of one source record.
//! CONTEXT: Records come from an upstream parser (spreadsheet or CSV) as loosely
//! typed scalars. Grouping compares values by their string form while
//! aggregation coerces them to numbers, so both conversions live here.

use serde::{Deserialize, Serialize, Serializer};

/// Largest integer an f64 represents exactly. Integral numbers below this
/// serialize as JSON integers so `5.0` and `5` produce the same key text.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Represents the raw data within one field of a record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Boolean(bool),
    Number(f64),
    Text(String),
}

/// Shared null used for lookups of fields a record does not carry.
pub const EMPTY: &CellValue = &CellValue::Empty;

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Coerces the value to a finite number.
    ///
    /// Numbers pass through, booleans become 1/0, and text is parsed as a
    /// decimal literal (surrounding whitespace ignored, `0x`/`0o`/`0b` radix
    /// prefixes accepted). Blank text, non-numeric text, NaN and infinities
    /// yield `None` so callers exclude them instead of treating them as zero.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Empty => return None,
            CellValue::Number(n) => *n,
            CellValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Text(s) => parse_number_text(s)?,
        };
        n.is_finite().then_some(n)
    }

    /// Returns the loose string form used for grouping comparisons.
    ///
    /// Nulls render as `"null"` and numbers use the shortest round-trip form
    /// (`5`, `2.5`, `1e+21`), which makes the number `5` and the text `"5"`
    /// compare equal. NaN and infinities join the null group, matching how
    /// they serialize.
    pub fn key_string(&self) -> String {
        match self {
            CellValue::Empty => "null".to_string(),
            CellValue::Number(n) if !n.is_finite() => "null".to_string(),
            CellValue::Number(n) => format_number_key(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => b.to_string(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_unit(),
            CellValue::Number(n) if !n.is_finite() => serializer.serialize_unit(),
            CellValue::Boolean(b) => serializer.serialize_bool(*b),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}

fn parse_number_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&trimmed[2..], radix).ok().map(|n| n as f64);
    }

    // Rust accepts "inf"/"nan" spellings; only digits, signs, dots and
    // exponents are decimal literals here.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn format_number_key(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }

    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        // Exponent form with an explicit sign on positive exponents.
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        }
    } else {
        format!("{}", n)
    }
}
