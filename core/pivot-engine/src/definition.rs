//! FILENAME: core/pivot-engine/src/definition.rs
//! Pivot Table Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a pivot table.
//! These structures are designed to be:
//! - Deserializable from the UI collaborator's JSON
//! - Hashable, so an interactive layer can memoize results per configuration
//! - Immutable snapshots of user intent

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PivotError, Result};

/// Separator between a base field name and a date part in a field identifier.
pub const DERIVED_FIELD_SEPARATOR: char = '|';

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for value fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    Sum,
    Count,
    #[serde(rename = "avg", alias = "average")]
    Average,
    Min,
    Max,
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Sum
    }
}

impl AggregationType {
    pub const ALL: [AggregationType; 5] = [
        AggregationType::Sum,
        AggregationType::Count,
        AggregationType::Average,
        AggregationType::Min,
        AggregationType::Max,
    ];

    /// Name used inside cell addresses.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::Sum => "sum",
            AggregationType::Count => "count",
            AggregationType::Average => "avg",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationType {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregationType::Sum),
            "count" => Ok(AggregationType::Count),
            "avg" | "average" => Ok(AggregationType::Average),
            "min" => Ok(AggregationType::Min),
            "max" => Ok(AggregationType::Max),
            _ => Err(PivotError::UnknownAggregation(s.to_string())),
        }
    }
}

// ============================================================================
// FIELD IDENTIFIERS
// ============================================================================

/// Levels of the date hierarchy derived from a date field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePart {
    Year,
    Quarter,
    Month,
    /// The full calendar date.
    Date,
}

impl DatePart {
    pub const ALL: [DatePart; 4] = [
        DatePart::Year,
        DatePart::Quarter,
        DatePart::Month,
        DatePart::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatePart::Year => "year",
            DatePart::Quarter => "quarter",
            DatePart::Month => "month",
            DatePart::Date => "date",
        }
    }

    /// Display suffix used in field labels.
    pub fn label(&self) -> &'static str {
        match self {
            DatePart::Year => "Year",
            DatePart::Quarter => "Quarter",
            DatePart::Month => "Month",
            DatePart::Date => "Full Date",
        }
    }
}

impl FromStr for DatePart {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        DatePart::ALL.into_iter().find(|p| p.as_str() == s).ok_or(())
    }
}

/// Identifies a grouping field: a column present in the records, or a date
/// part derived on demand from one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldId {
    Base(String),
    Derived(String, DatePart),
}

impl FieldId {
    pub fn base(name: impl Into<String>) -> Self {
        FieldId::Base(name.into())
    }

    pub fn derived(name: impl Into<String>, part: DatePart) -> Self {
        FieldId::Derived(name.into(), part)
    }

    /// Parses the textual form `name` or `name|part`.
    ///
    /// Only the text after the last `|` is checked for a date part. When it
    /// is not one, the whole text is a base field name, so columns such as
    /// `Price|USD` stay usable. A base field whose name itself ends in a
    /// date-part suffix (`x|year`) cannot be addressed.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(PivotError::EmptyFieldId);
        }
        match text.rsplit_once(DERIVED_FIELD_SEPARATOR) {
            Some((field, part)) => match part.parse::<DatePart>() {
                Ok(_) if field.is_empty() => Err(PivotError::EmptyFieldId),
                Ok(part) => Ok(FieldId::Derived(field.to_string(), part)),
                Err(()) => Ok(FieldId::Base(text.to_string())),
            },
            None => Ok(FieldId::Base(text.to_string())),
        }
    }

    /// Name of the record field this identifier reads from.
    pub fn base_name(&self) -> &str {
        match self {
            FieldId::Base(name) | FieldId::Derived(name, _) => name,
        }
    }

    pub fn date_part(&self) -> Option<DatePart> {
        match self {
            FieldId::Base(_) => None,
            FieldId::Derived(_, part) => Some(*part),
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldId::Base(name) => f.write_str(name),
            FieldId::Derived(name, part) => {
                write!(f, "{}{}{}", name, DERIVED_FIELD_SEPARATOR, part.as_str())
            }
        }
    }
}

impl FromStr for FieldId {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self> {
        FieldId::parse(s)
    }
}

impl TryFrom<String> for FieldId {
    type Error = PivotError;

    fn try_from(value: String) -> Result<Self> {
        FieldId::parse(&value)
    }
}

impl From<FieldId> for String {
    fn from(value: FieldId) -> Self {
        value.to_string()
    }
}

// ============================================================================
// VALUE FIELDS
// ============================================================================

fn default_aggregations() -> Vec<AggregationType> {
    vec![AggregationType::Sum]
}

/// A value field with the aggregations computed for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueField {
    /// Plain record field name (never a derived identifier).
    pub field: String,

    /// Aggregations to compute, in cell order. Defaults to `[sum]`.
    #[serde(default = "default_aggregations")]
    pub aggregations: Vec<AggregationType>,
}

impl ValueField {
    pub fn new(field: impl Into<String>, aggregation: AggregationType) -> Self {
        ValueField {
            field: field.into(),
            aggregations: vec![aggregation],
        }
    }

    pub fn with_aggregations(field: impl Into<String>, aggregations: Vec<AggregationType>) -> Self {
        ValueField {
            field: field.into(),
            aggregations,
        }
    }

    pub fn has_aggregation(&self, aggregation: AggregationType) -> bool {
        self.aggregations.contains(&aggregation)
    }
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// The complete definition of a pivot table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PivotDefinition {
    /// Fields placed in the Row area (ordered from outer to inner).
    #[serde(default)]
    pub row_fields: Vec<FieldId>,

    /// Fields placed in the Column area (ordered from outer to inner).
    #[serde(default)]
    pub column_fields: Vec<FieldId>,

    /// Fields placed in the Values area.
    #[serde(default)]
    pub value_fields: Vec<ValueField>,
}

impl PivotDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a definition where every value field gets every aggregation.
    pub fn cross(
        row_fields: Vec<FieldId>,
        column_fields: Vec<FieldId>,
        value_fields: &[&str],
        aggregations: &[AggregationType],
    ) -> Self {
        PivotDefinition {
            row_fields,
            column_fields,
            value_fields: value_fields
                .iter()
                .map(|f| ValueField::with_aggregations(*f, aggregations.to_vec()))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// True when at least one row or column field is configured.
    pub fn has_grouping_fields(&self) -> bool {
        !self.row_fields.is_empty() || !self.column_fields.is_empty()
    }

    /// Every (value field, aggregation) pair in cell order.
    pub fn cell_specs(&self) -> impl Iterator<Item = (&str, AggregationType)> + '_ {
        self.value_fields.iter().flat_map(|vf| {
            vf.aggregations
                .iter()
                .map(move |&aggregation| (vf.field.as_str(), aggregation))
        })
    }

    /// True when the definition asks for at least one cell.
    pub fn is_computable(&self) -> bool {
        self.has_grouping_fields() && self.cell_specs().next().is_some()
    }
}
