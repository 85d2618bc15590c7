//! FILENAME: core/records/src/field_type.rs
//! PURPOSE: Classifies each field of a record set as number, date, or text.

use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::date::{is_date_text, is_serial_date};
use crate::record::RecordSet;

/// Number of leading records sampled per field.
pub const TYPE_SAMPLE_SIZE: usize = 5;

/// Inferred type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    Date,
    Text,
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Text
    }
}

/// Classifies one field from its sample values. Nulls are ignored.
///
/// Precedence is date > number > text: any serial-looking number or date
/// text makes the field a date; a non-empty sample set of numbers makes it a
/// number; everything else, including an all-null sample, is text.
pub fn detect_field_type<'a, I>(samples: I) -> FieldType
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let samples: Vec<&CellValue> = samples.into_iter().filter(|v| !v.is_empty()).collect();

    if samples.iter().any(|v| is_serial_date(v) || is_date_text(v)) {
        return FieldType::Date;
    }
    if !samples.is_empty() && samples.iter().all(|v| v.as_number().is_some()) {
        return FieldType::Number;
    }
    FieldType::Text
}

/// Infers the type of every catalog field from the first `TYPE_SAMPLE_SIZE`
/// records. Returns fields in catalog order; an empty set has no fields.
pub fn detect_field_types(records: &RecordSet) -> Vec<(String, FieldType)> {
    records
        .field_names()
        .iter()
        .map(|name| {
            let samples = records.iter().take(TYPE_SAMPLE_SIZE).map(|r| r.get(name));
            (name.clone(), detect_field_type(samples))
        })
        .collect()
}
