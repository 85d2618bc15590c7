//! FILENAME: tests/common/mod.rs
//! Fixtures and assertion helpers for pivot-engine integration tests.

#![allow(dead_code)]

use pivot_engine::{AggregationType, CellAddress, PivotResult, PivotRow};
use records::{CellValue, RecordSet};

/// Sample financial data for pivot table testing.
pub struct SalesFixture;

impl SalesFixture {
    pub fn headers() -> Vec<&'static str> {
        vec!["Region", "Product", "Quarter", "Sales", "Quantity", "Order Date"]
    }

    /// (region, product, quarter, sales, quantity, order date serial)
    pub fn data() -> Vec<(&'static str, &'static str, &'static str, f64, f64, f64)> {
        vec![
            ("North", "Widget", "Q1", 10000.0, 100.0, 44936.0),
            ("North", "Widget", "Q2", 12000.0, 120.0, 45017.0),
            ("North", "Gadget", "Q1", 8000.0, 80.0, 44960.0),
            ("North", "Gadget", "Q2", 9000.0, 90.0, 45050.0),
            ("South", "Widget", "Q1", 15000.0, 150.0, 44941.0),
            ("South", "Widget", "Q2", 14000.0, 140.0, 45030.0),
            ("South", "Gadget", "Q1", 11000.0, 110.0, 44990.0),
            ("South", "Gadget", "Q2", 13000.0, 130.0, 45070.0),
            ("East", "Widget", "Q1", 9000.0, 90.0, 44950.0),
            ("East", "Widget", "Q2", 11000.0, 110.0, 45040.0),
            ("East", "Gadget", "Q1", 7000.0, 70.0, 44980.0),
            ("East", "Gadget", "Q2", 8500.0, 85.0, 45100.0),
        ]
    }

    pub fn records() -> RecordSet {
        let fields = Self::headers().into_iter().map(String::from).collect();
        let rows = Self::data()
            .into_iter()
            .map(|(region, product, quarter, sales, quantity, order_date)| {
                vec![
                    CellValue::from(region),
                    CellValue::from(product),
                    CellValue::from(quarter),
                    CellValue::from(sales),
                    CellValue::from(quantity),
                    CellValue::from(order_date),
                ]
            })
            .collect();
        RecordSet::from_rows(fields, rows)
    }

    /// Total of the Sales column.
    pub fn total_sales() -> f64 {
        Self::data().iter().map(|row| row.3).sum()
    }

    /// Synthetic data set of `rows` records for performance tests.
    pub fn large(rows: usize) -> RecordSet {
        const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
        const PRODUCTS: [&str; 5] = ["Widget", "Gadget", "Gizmo", "Doohickey", "Sprocket"];

        let fields = Self::headers().into_iter().map(String::from).collect();
        let data = (0..rows)
            .map(|i| {
                vec![
                    CellValue::from(REGIONS[i % REGIONS.len()]),
                    CellValue::from(PRODUCTS[(i / 4) % PRODUCTS.len()]),
                    CellValue::from(format!("Q{}", i % 4 + 1)),
                    CellValue::from((i % 97) as f64 * 10.0),
                    CellValue::from((i % 13) as f64),
                    CellValue::from(44927.0 + (i % 730) as f64),
                ]
            })
            .collect();
        RecordSet::from_rows(fields, data)
    }
}

// ============================================================================
// ASSERTION HELPERS
// ============================================================================

/// Finds a row by its labels, panicking with the available rows otherwise.
pub fn row<'a>(result: &'a PivotResult, labels: &[&str]) -> &'a PivotRow {
    result.find_row(labels).unwrap_or_else(|| {
        let available: Vec<Vec<String>> = result
            .rows
            .iter()
            .map(|r| r.row_values.iter().map(CellValue::key_string).collect())
            .collect();
        panic!("Row {:?} not found in {:?}", labels, available)
    })
}

/// Assert that a cell holds a number close to `expected`.
pub fn assert_cell(row: &PivotRow, address: &CellAddress, expected: f64) {
    match row.cell(address) {
        Some(n) => assert!(
            (n - expected).abs() < 0.001,
            "Cell {} expected {} but got {}",
            address,
            expected,
            n
        ),
        None => panic!("Cell {} expected {} but was null", address, expected),
    }
}

/// Assert that a column grand-total cell holds a number close to `expected`.
pub fn assert_column_total(result: &PivotResult, address: &CellAddress, expected: f64) {
    match result.column_total(address) {
        Some(n) => assert!(
            (n - expected).abs() < 0.001,
            "Column total {} expected {} but got {}",
            address,
            expected,
            n
        ),
        None => panic!("Column total {} expected {} but was null", address, expected),
    }
}

/// Shorthand for the JSON key of a single-field column header.
pub fn column_key(label: &str) -> String {
    format!("[\"{}\"]", label)
}

pub fn sum(column_key: &str, field: &str) -> CellAddress {
    CellAddress::new(column_key, field, AggregationType::Sum)
}
