//! FILENAME: core/pivot-engine/src/view.rs
//! Pivot View - The computed cross-tabulation handed to the consumer.
//!
//! Cells are addressed by `column key|value field|aggregation`. Every row also
//! carries `grandTotal|...` cells, and the column grand totals live in their
//! own cell map with the same addressing.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cache::KeyTuple;
use crate::definition::AggregationType;

/// Column key of the synthetic header used when no column fields are set.
pub const TOTAL_COLUMN_KEY: &str = "total";

/// Display value of the synthetic "Total" header.
pub const TOTAL_COLUMN_LABEL: &str = "Total";

/// Pseudo-column key of grand-total cells.
pub const GRAND_TOTAL_KEY: &str = "grandTotal";

/// Aggregate results keyed by encoded cell address. `None` means no value
/// contributed to the cell.
pub type CellMap = FxHashMap<String, Option<f64>>;

// ============================================================================
// CELL ADDRESS
// ============================================================================

/// Address of one aggregate within a row (or the grand-total row).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    pub column_key: String,
    pub value_field: String,
    pub aggregation: AggregationType,
}

impl CellAddress {
    pub fn new(
        column_key: impl Into<String>,
        value_field: impl Into<String>,
        aggregation: AggregationType,
    ) -> Self {
        CellAddress {
            column_key: column_key.into(),
            value_field: value_field.into(),
            aggregation,
        }
    }

    /// Address of the row-wise (or table-wide) grand total.
    pub fn grand_total(value_field: impl Into<String>, aggregation: AggregationType) -> Self {
        CellAddress::new(GRAND_TOTAL_KEY, value_field, aggregation)
    }

    /// Pipe-joined form used as the cell map key.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.column_key, self.value_field, self.aggregation)
    }
}

// ============================================================================
// HEADERS AND ROWS
// ============================================================================

/// One column group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHeader {
    /// Stable key correlating cells with this column (JSON of `values`).
    pub key: String,

    /// Display tuple, one value per column field.
    pub values: KeyTuple,
}

impl ColumnHeader {
    /// True for the synthetic header standing in for the whole table.
    pub fn is_total(&self) -> bool {
        self.key == TOTAL_COLUMN_KEY
    }
}

/// One row group with its cells and row grand totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    pub row_values: KeyTuple,
    pub cells: CellMap,
}

impl PivotRow {
    /// Value of a cell; `None` when the cell is null or was not requested.
    pub fn cell(&self, address: &CellAddress) -> Option<f64> {
        self.cells.get(&address.encode()).copied().flatten()
    }
}

/// The full pivot output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotResult {
    pub column_headers: Vec<ColumnHeader>,
    pub rows: Vec<PivotRow>,

    /// Per-column totals over all rows, plus the table-wide `grandTotal` cells.
    pub column_grand_totals: CellMap,
}

impl PivotResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.column_headers.is_empty()
    }

    /// Value of a cell in the column grand-total row.
    pub fn column_total(&self, address: &CellAddress) -> Option<f64> {
        self.column_grand_totals.get(&address.encode()).copied().flatten()
    }

    /// Finds the first row whose values stringify to the given labels.
    pub fn find_row(&self, labels: &[&str]) -> Option<&PivotRow> {
        self.rows.iter().find(|row| {
            row.row_values.len() == labels.len()
                && row
                    .row_values
                    .iter()
                    .zip(labels)
                    .all(|(value, label)| value.key_string() == *label)
        })
    }

    /// Finds the column header whose values stringify to the given labels.
    pub fn find_column(&self, labels: &[&str]) -> Option<&ColumnHeader> {
        self.column_headers.iter().find(|header| {
            header.values.len() == labels.len()
                && header
                    .values
                    .iter()
                    .zip(labels)
                    .all(|(value, label)| value.key_string() == *label)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_address_encoding() {
        let address = CellAddress::new(r#"["East"]"#, "qty", AggregationType::Average);
        assert_eq!(address.encode(), r#"["East"]|qty|avg"#);
        assert_eq!(
            CellAddress::grand_total("qty", AggregationType::Sum).encode(),
            "grandTotal|qty|sum"
        );
    }

    #[test]
    fn test_row_cell_lookup_flattens_nulls() {
        let mut cells = CellMap::default();
        cells.insert("total|qty|sum".to_string(), Some(3.0));
        cells.insert("total|qty|min".to_string(), None);
        let row = PivotRow {
            row_values: KeyTuple::new(),
            cells,
        };

        assert_eq!(row.cell(&CellAddress::new("total", "qty", AggregationType::Sum)), Some(3.0));
        assert_eq!(row.cell(&CellAddress::new("total", "qty", AggregationType::Min)), None);
        assert_eq!(row.cell(&CellAddress::new("total", "qty", AggregationType::Max)), None);
    }
}
