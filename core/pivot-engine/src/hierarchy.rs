//! FILENAME: core/pivot-engine/src/hierarchy.rs
//! Date hierarchy fields and field value resolution.
//!
//! Date fields expand into four derived grouping fields (year, quarter, month,
//! full date). Derived values are computed from the base value on every
//! lookup and never written back to the record.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use records::{detect_field_types, to_date, CellValue, FieldType, Record, RecordSet};

use crate::definition::{DatePart, FieldId};

/// A selectable field shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub id: FieldId,
}

/// Formats the display name for a date hierarchy level.
pub fn format_date_level_name(field_name: &str, part: DatePart) -> String {
    format!("{} ({})", field_name, part.label())
}

/// Builds the derived year/quarter/month/full-date options for date fields.
pub fn date_hierarchy_fields<S: AsRef<str>>(date_fields: &[S]) -> Vec<FieldOption> {
    date_fields
        .iter()
        .flat_map(|field| {
            let field = field.as_ref();
            DatePart::ALL.into_iter().map(move |part| FieldOption {
                label: format_date_level_name(field, part),
                id: FieldId::derived(field, part),
            })
        })
        .collect()
}

/// The extended field catalog: base fields with their inferred types, plus
/// the derived date fields usable for grouping only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldCatalog {
    pub fields: Vec<(String, FieldType)>,
    pub derived: Vec<FieldOption>,
}

impl FieldCatalog {
    pub fn from_records(records: &RecordSet) -> Self {
        let fields = detect_field_types(records);
        let date_fields: Vec<&str> = fields
            .iter()
            .filter(|(_, field_type)| *field_type == FieldType::Date)
            .map(|(name, _)| name.as_str())
            .collect();
        let derived = date_hierarchy_fields(&date_fields);

        FieldCatalog { fields, derived }
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, field_type)| *field_type)
    }

    /// Options for the Values area (base fields only).
    pub fn value_options(&self) -> Vec<FieldOption> {
        self.fields
            .iter()
            .map(|(name, _)| FieldOption {
                label: name.clone(),
                id: FieldId::base(name.as_str()),
            })
            .collect()
    }

    /// Options for the Row/Column areas (base fields, then derived fields).
    pub fn grouping_options(&self) -> Vec<FieldOption> {
        let mut options = self.value_options();
        options.extend(self.derived.iter().cloned());
        options
    }
}

// ============================================================================
// FIELD VALUE RESOLUTION
// ============================================================================

/// Extracts one date part as grouping text.
pub fn format_date_part(date: NaiveDate, part: DatePart) -> String {
    match part {
        DatePart::Year => date.year().to_string(),
        DatePart::Quarter => format!("Q{}", (date.month() + 2) / 3),
        DatePart::Month => date.format("%b %Y").to_string(),
        DatePart::Date => date.format("%m/%d/%Y").to_string(),
    }
}

/// Resolves a date part from a raw value. Values that are not dates give null.
pub fn date_part_value(value: &CellValue, part: DatePart) -> CellValue {
    match to_date(value) {
        Some(date) => CellValue::Text(format_date_part(date, part)),
        None => CellValue::Empty,
    }
}

/// Computes the effective grouping value of a field for one record.
pub fn resolve_field(record: &Record<'_>, field: &FieldId) -> CellValue {
    match field {
        FieldId::Base(name) => record.get(name).clone(),
        FieldId::Derived(name, part) => date_part_value(record.get(name), *part),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date_records() -> RecordSet {
        RecordSet::from_records(vec![
            vec![("when", CellValue::from(45000.0)), ("qty", CellValue::from(1.0))],
            vec![("when", CellValue::from("2024-11-02")), ("qty", CellValue::from(2.0))],
            vec![("when", CellValue::from("garbage")), ("qty", CellValue::from(3.0))],
            vec![("qty", CellValue::from(4.0))],
        ])
    }

    #[test]
    fn test_date_hierarchy_labels_and_ids() {
        let options = date_hierarchy_fields(&["Order Date"]);
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Order Date (Year)",
                "Order Date (Quarter)",
                "Order Date (Month)",
                "Order Date (Full Date)",
            ]
        );
        let ids: Vec<String> = options.iter().map(|o| o.id.to_string()).collect();
        assert_eq!(
            ids,
            vec!["Order Date|year", "Order Date|quarter", "Order Date|month", "Order Date|date"]
        );
    }

    #[test]
    fn test_serial_date_parts() {
        let set = date_records();
        let record = set.record(0).unwrap();

        let year = resolve_field(&record, &FieldId::derived("when", DatePart::Year));
        let quarter = resolve_field(&record, &FieldId::derived("when", DatePart::Quarter));
        let month = resolve_field(&record, &FieldId::derived("when", DatePart::Month));
        let date = resolve_field(&record, &FieldId::derived("when", DatePart::Date));

        assert_eq!(year, CellValue::text("2023"));
        assert_eq!(quarter, CellValue::text("Q1"));
        assert_eq!(month, CellValue::text("Mar 2023"));
        assert_eq!(date, CellValue::text("03/15/2023"));
    }

    #[test]
    fn test_text_date_parts() {
        let set = date_records();
        let record = set.record(1).unwrap();
        assert_eq!(
            resolve_field(&record, &FieldId::derived("when", DatePart::Quarter)),
            CellValue::text("Q4")
        );
        assert_eq!(
            resolve_field(&record, &FieldId::derived("when", DatePart::Month)),
            CellValue::text("Nov 2024")
        );
    }

    #[test]
    fn test_unparseable_and_missing_dates_resolve_to_null() {
        let set = date_records();
        let garbage = set.record(2).unwrap();
        let missing = set.record(3).unwrap();
        let id = FieldId::derived("when", DatePart::Year);

        assert_eq!(resolve_field(&garbage, &id), CellValue::Empty);
        assert_eq!(resolve_field(&missing, &id), CellValue::Empty);
        assert_eq!(resolve_field(&missing, &FieldId::base("when")), CellValue::Empty);
        assert_eq!(resolve_field(&missing, &FieldId::base("qty")), CellValue::Number(4.0));
    }

    #[test]
    fn test_catalog_expands_date_fields() {
        let catalog = FieldCatalog::from_records(&date_records());

        assert_eq!(catalog.field_type("when"), Some(FieldType::Date));
        assert_eq!(catalog.field_type("qty"), Some(FieldType::Number));
        assert_eq!(catalog.derived.len(), 4);
        assert_eq!(catalog.value_options().len(), 2);
        assert_eq!(catalog.grouping_options().len(), 6);
    }
}
