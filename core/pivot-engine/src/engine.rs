//! FILENAME: core/pivot-engine/src/engine.rs
//! Pivot Engine - The calculation core that turns records into a cross-tab.
//!
//! This module takes a PivotDefinition (configuration) and a RecordSet (data)
//! and produces a PivotResult.
//!
//! Algorithm:
//! 1. Build the cache: resolve every grouping field (including derived date
//!    parts) for every record and fold value fields into accumulators
//! 2. Build column headers (or the single synthetic "Total" header)
//! 3. Cross-tabulate: one cell per (row, column, value field, aggregation)
//! 4. Recombine each row's cells into its row grand totals
//! 5. Compute column grand totals and the table-wide grand total

use smallvec::smallvec;

use records::{CellValue, RecordSet};

use crate::cache::{PivotCache, ALL_COLUMNS};
use crate::definition::{AggregationType, FieldId, PivotDefinition};
use crate::error::Result;
use crate::view::{
    CellAddress, CellMap, ColumnHeader, PivotResult, PivotRow, TOTAL_COLUMN_KEY, TOTAL_COLUMN_LABEL,
};

// ============================================================================
// PIVOT CALCULATOR
// ============================================================================

/// The main calculation engine for pivot tables.
pub struct PivotCalculator<'a> {
    definition: &'a PivotDefinition,
    records: &'a RecordSet,

    /// Grouping and accumulator state, filled by `build_cache`.
    cache: PivotCache,

    /// Column headers in output order.
    column_headers: Vec<ColumnHeader>,

    /// Cache column group of each header (parallel to `column_headers`).
    header_groups: Vec<usize>,
}

impl<'a> PivotCalculator<'a> {
    /// Creates a new calculator instance.
    pub fn new(definition: &'a PivotDefinition, records: &'a RecordSet) -> Self {
        PivotCalculator {
            definition,
            records,
            cache: PivotCache::default(),
            column_headers: Vec::new(),
            header_groups: Vec::new(),
        }
    }

    /// Executes the full calculation.
    pub fn calculate(&mut self) -> Result<PivotResult> {
        if self.records.is_empty() || !self.definition.is_computable() {
            log::debug!(
                target: "pivot",
                "nothing to compute records={} grouping={} cells={}",
                self.records.len(),
                self.definition.has_grouping_fields(),
                self.definition.cell_specs().count()
            );
            return Ok(PivotResult::default());
        }

        // Step 1: Resolve grouping fields and fold values
        self.build_cache();

        // Step 2: Column headers
        self.build_column_headers()?;

        // Step 3: Cells per row
        let mut rows = self.generate_rows();

        // Step 4: Row grand totals
        for row in &mut rows {
            self.apply_row_grand_totals(row);
        }

        // Step 5: Column grand totals
        let column_grand_totals = self.compute_column_grand_totals();

        log::debug!(
            target: "pivot",
            "calculated records={} rows={} columns={} cells_per_row={}",
            self.cache.record_count,
            rows.len(),
            self.column_headers.len(),
            rows.first().map_or(0, |r| r.cells.len())
        );

        Ok(PivotResult {
            column_headers: std::mem::take(&mut self.column_headers),
            rows,
            column_grand_totals,
        })
    }

    fn build_cache(&mut self) {
        let value_fields: Vec<&str> = self
            .definition
            .value_fields
            .iter()
            .map(|vf| vf.field.as_str())
            .collect();

        self.cache = PivotCache::build(
            self.records,
            &self.definition.row_fields,
            &self.definition.column_fields,
            &value_fields,
        );
    }

    /// Builds one header per distinct column tuple, keyed by the tuple's JSON.
    fn build_column_headers(&mut self) -> Result<()> {
        self.column_headers.clear();
        self.header_groups.clear();

        if self.definition.column_fields.is_empty() {
            self.column_headers.push(ColumnHeader {
                key: TOTAL_COLUMN_KEY.to_string(),
                values: smallvec![CellValue::text(TOTAL_COLUMN_LABEL)],
            });
            self.header_groups.push(ALL_COLUMNS);
            return Ok(());
        }

        for (group, values) in self.cache.column_tuples.iter().enumerate() {
            let key = serde_json::to_string(values.as_slice())?;
            self.column_headers.push(ColumnHeader {
                key,
                values: values.clone(),
            });
            self.header_groups.push(group);
        }
        Ok(())
    }

    fn generate_rows(&self) -> Vec<PivotRow> {
        self.cache
            .row_tuples
            .iter()
            .enumerate()
            .map(|(row_group, row_values)| PivotRow {
                row_values: row_values.clone(),
                cells: self.generate_row_cells(row_group),
            })
            .collect()
    }

    fn generate_row_cells(&self, row_group: usize) -> CellMap {
        let mut cells = CellMap::default();
        for (header, &column_group) in self.column_headers.iter().zip(&self.header_groups) {
            for (value_field, aggregation) in self.definition.cell_specs() {
                let address = CellAddress::new(header.key.as_str(), value_field, aggregation);
                let value = self
                    .cache
                    .cell_value(row_group, column_group, value_field, aggregation);
                cells.insert(address.encode(), value);
            }
        }
        cells
    }

    /// Adds `grandTotal|field|aggregation` cells recombined from the row's
    /// per-column cells.
    fn apply_row_grand_totals(&self, row: &mut PivotRow) {
        for value_field in &self.definition.value_fields {
            let field = value_field.field.as_str();
            let has_count = value_field.has_aggregation(AggregationType::Count);

            for &aggregation in &value_field.aggregations {
                let column_cells: Vec<(Option<f64>, Option<f64>)> = self
                    .column_headers
                    .iter()
                    .map(|header| {
                        let value = row_cell(&row.cells, &header.key, field, aggregation);
                        let count = if has_count {
                            row_cell(&row.cells, &header.key, field, AggregationType::Count)
                        } else {
                            None
                        };
                        (value, count)
                    })
                    .collect();

                let total = recombine_cells(aggregation, &column_cells);
                row.cells.insert(
                    CellAddress::grand_total(field, aggregation).encode(),
                    total,
                );
            }
        }
    }

    /// Per-column totals over all rows, plus the table-wide grand totals
    /// computed directly from every record.
    fn compute_column_grand_totals(&self) -> CellMap {
        let mut cells = CellMap::default();

        for (header, &column_group) in self.column_headers.iter().zip(&self.header_groups) {
            for (value_field, aggregation) in self.definition.cell_specs() {
                let address = CellAddress::new(header.key.as_str(), value_field, aggregation);
                let value = self.cache.column_total(column_group, value_field, aggregation);
                cells.insert(address.encode(), value);
            }
        }

        for (value_field, aggregation) in self.definition.cell_specs() {
            cells.insert(
                CellAddress::grand_total(value_field, aggregation).encode(),
                self.cache.grand_total(value_field, aggregation),
            );
        }

        cells
    }
}

fn row_cell(
    cells: &CellMap,
    column_key: &str,
    value_field: &str,
    aggregation: AggregationType,
) -> Option<f64> {
    cells
        .get(&CellAddress::new(column_key, value_field, aggregation).encode())
        .copied()
        .flatten()
}

// ============================================================================
// ROW GRAND TOTAL RECOMBINATION
// ============================================================================

/// Recombines one row's per-column cells into a row grand total.
///
/// Each entry is `(cell value, count cell)`. Sum adds the non-null cells, min
/// and max reduce them, count adds the per-column counts (null when zero).
/// Average is weighted by the column's count cell when one exists and is
/// non-zero, otherwise by 1. Without a count aggregation next to the average
/// the result is an approximation of the true row average.
pub fn recombine_cells(
    aggregation: AggregationType,
    cells: &[(Option<f64>, Option<f64>)],
) -> Option<f64> {
    let values = cells.iter().filter_map(|(value, _)| *value);

    match aggregation {
        AggregationType::Sum => values.reduce(|acc, v| acc + v),
        AggregationType::Min => values.reduce(f64::min),
        AggregationType::Max => values.reduce(f64::max),
        AggregationType::Count => {
            let total: f64 = values.sum();
            (total > 0.0).then_some(total)
        }
        AggregationType::Average => {
            let mut weighted_sum = 0.0;
            let mut total_weight = 0.0;
            let mut has_values = false;
            for (value, count) in cells {
                if let Some(avg) = value {
                    let weight = count.filter(|c| *c != 0.0).unwrap_or(1.0);
                    weighted_sum += avg * weight;
                    total_weight += weight;
                    has_values = true;
                }
            }
            has_values.then(|| weighted_sum / total_weight)
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Calculates a pivot table from records and a definition.
/// This is the main entry point for the calculation engine.
pub fn calculate_pivot(records: &RecordSet, definition: &PivotDefinition) -> Result<PivotResult> {
    let mut calculator = PivotCalculator::new(definition, records);
    calculator.calculate()
}

/// Calculates a pivot table where every value field gets every aggregation.
/// Field identifiers use the textual `name` / `name|part` form.
pub fn generate_pivot(
    records: &RecordSet,
    row_fields: &[&str],
    column_fields: &[&str],
    value_fields: &[&str],
    aggregations: &[AggregationType],
) -> Result<PivotResult> {
    let row_fields = row_fields
        .iter()
        .map(|f| FieldId::parse(f))
        .collect::<Result<Vec<_>>>()?;
    let column_fields = column_fields
        .iter()
        .map(|f| FieldId::parse(f))
        .collect::<Result<Vec<_>>>()?;

    let definition = PivotDefinition::cross(row_fields, column_fields, value_fields, aggregations);
    calculate_pivot(records, &definition)
}
