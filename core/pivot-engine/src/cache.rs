//! FILENAME: core/pivot-engine/src/cache.rs
//! Pivot Cache - Materialized grouping keys and aggregate accumulators.
//!
//! The cache is built once per calculation:
//! - Every grouping field (base or derived) is resolved for every record up
//!   front, so filtering treats all grouping fields uniformly
//! - Row and column tuples are interned in first-seen order and each record
//!   is tagged with the row/column group it belongs to
//! - Value fields are coerced to numbers once and folded into accumulators
//!   keyed by (row group, column group)

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use records::{CellValue, Record, RecordSet};

use crate::definition::{AggregationType, FieldId};
use crate::hierarchy::resolve_field;

// ============================================================================
// GROUP KEYS
// ============================================================================

/// Ordered resolved values, one per grouping field.
pub type KeyTuple = SmallVec<[CellValue; 4]>;

/// Loose equality of grouping values: two values are equal when their string
/// forms are equal, so the number `5` and the text `"5"` form one group.
pub fn group_key_equals(a: &CellValue, b: &CellValue) -> bool {
    a.key_string() == b.key_string()
}

/// Hashable form of a tuple under `group_key_equals`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub values: SmallVec<[String; 4]>,
}

impl GroupKey {
    pub fn from_values(values: &[CellValue]) -> Self {
        GroupKey {
            values: values.iter().map(CellValue::key_string).collect(),
        }
    }
}

/// Interns tuples in first-seen order.
#[derive(Debug, Default)]
struct TupleInterner {
    index: FxHashMap<GroupKey, usize>,
    tuples: Vec<KeyTuple>,
}

impl TupleInterner {
    fn intern(&mut self, tuple: KeyTuple) -> usize {
        let key = GroupKey::from_values(&tuple);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.tuples.len();
        self.index.insert(key, id);
        self.tuples.push(tuple);
        id
    }
}

fn resolve_tuple(record: &Record<'_>, fields: &[FieldId]) -> KeyTuple {
    fields.iter().map(|field| resolve_field(record, field)).collect()
}

/// Unique value tuples of `fields` across all records, in first-seen order.
/// With no fields this is exactly one empty tuple.
pub fn unique_tuples(records: &RecordSet, fields: &[FieldId]) -> Vec<KeyTuple> {
    if fields.is_empty() {
        return vec![KeyTuple::new()];
    }

    let mut interner = TupleInterner::default();
    for record in records.iter() {
        interner.intern(resolve_tuple(&record, fields));
    }
    interner.tuples
}

// ============================================================================
// AGGREGATE ACCUMULATOR
// ============================================================================

/// Accumulator for computing aggregates incrementally.
/// Values are folded in record order so sums match a left-to-right reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateAccumulator {
    pub sum: f64,
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a numeric value to the accumulator.
    pub fn add_number(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Adds a raw value; values that do not coerce to a number are skipped.
    pub fn add_value(&mut self, value: &CellValue) {
        if let Some(n) = value.as_number() {
            self.add_number(n);
        }
    }

    /// Computes the final aggregate, or `None` when nothing contributed.
    pub fn compute(&self, aggregation: AggregationType) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        match aggregation {
            AggregationType::Sum => Some(self.sum),
            AggregationType::Count => Some(self.count as f64),
            AggregationType::Average => Some(self.sum / self.count as f64),
            AggregationType::Min => self.min,
            AggregationType::Max => self.max,
        }
    }
}

/// Aggregates one value field over a set of records.
/// Non-numeric and null values are excluded; an empty input gives `None`.
pub fn aggregate<'a, I>(rows: I, value_field: &str, aggregation: AggregationType) -> Option<f64>
where
    I: IntoIterator<Item = Record<'a>>,
{
    let mut acc = AggregateAccumulator::new();
    for record in rows {
        acc.add_value(record.get(value_field));
    }
    acc.compute(aggregation)
}

// ============================================================================
// MAIN CACHE STRUCT
// ============================================================================

/// Sentinel column group meaning "all columns" (the synthetic Total column).
pub const ALL_COLUMNS: usize = usize::MAX;

/// Grouping state and accumulators for one calculation.
#[derive(Debug, Default)]
pub struct PivotCache {
    /// Distinct row tuples in first-seen order.
    pub row_tuples: Vec<KeyTuple>,

    /// Distinct column tuples in first-seen order (empty without column fields).
    pub column_tuples: Vec<KeyTuple>,

    /// Distinct value field names; accumulators are indexed by position here.
    pub value_fields: Vec<String>,

    /// Accumulators per (row group, column group), one per value field.
    /// Column group is `ALL_COLUMNS` when no column fields are configured.
    cells: FxHashMap<(usize, usize), Vec<AggregateAccumulator>>,

    /// Accumulators per column group over all rows.
    column_totals: FxHashMap<usize, Vec<AggregateAccumulator>>,

    /// Accumulators over the entire record set.
    grand_total: Vec<AggregateAccumulator>,

    /// Number of records folded into the cache.
    pub record_count: usize,
}

impl PivotCache {
    /// Resolves all grouping fields for every record and folds value fields
    /// into accumulators.
    pub fn build(
        records: &RecordSet,
        row_fields: &[FieldId],
        column_fields: &[FieldId],
        value_fields: &[&str],
    ) -> Self {
        let mut value_names: Vec<String> = Vec::new();
        for name in value_fields {
            if !value_names.iter().any(|v| v == name) {
                value_names.push(name.to_string());
            }
        }
        let value_count = value_names.len();

        let mut rows = TupleInterner::default();
        let mut columns = TupleInterner::default();
        let mut cells: FxHashMap<(usize, usize), Vec<AggregateAccumulator>> = FxHashMap::default();
        let mut column_totals: FxHashMap<usize, Vec<AggregateAccumulator>> = FxHashMap::default();
        let mut grand_total = vec![AggregateAccumulator::new(); value_count];

        for record in records.iter() {
            let row_id = rows.intern(resolve_tuple(&record, row_fields));
            let col_id = if column_fields.is_empty() {
                ALL_COLUMNS
            } else {
                columns.intern(resolve_tuple(&record, column_fields))
            };

            let numbers: SmallVec<[Option<f64>; 4]> = value_names
                .iter()
                .map(|name| record.get(name).as_number())
                .collect();

            let cell = cells
                .entry((row_id, col_id))
                .or_insert_with(|| vec![AggregateAccumulator::new(); value_count]);
            let column_total = column_totals
                .entry(col_id)
                .or_insert_with(|| vec![AggregateAccumulator::new(); value_count]);

            for (idx, number) in numbers.iter().enumerate() {
                if let Some(n) = *number {
                    cell[idx].add_number(n);
                    column_total[idx].add_number(n);
                    grand_total[idx].add_number(n);
                }
            }
        }

        PivotCache {
            row_tuples: rows.tuples,
            column_tuples: columns.tuples,
            value_fields: value_names,
            cells,
            column_totals,
            grand_total,
            record_count: records.len(),
        }
    }

    fn value_index(&self, value_field: &str) -> Option<usize> {
        self.value_fields.iter().position(|v| v == value_field)
    }

    /// Aggregate of the records in one row group and column group.
    pub fn cell_value(
        &self,
        row: usize,
        column: usize,
        value_field: &str,
        aggregation: AggregationType,
    ) -> Option<f64> {
        let idx = self.value_index(value_field)?;
        self.cells.get(&(row, column))?.get(idx)?.compute(aggregation)
    }

    /// Aggregate of the records in one column group, across all rows.
    pub fn column_total(
        &self,
        column: usize,
        value_field: &str,
        aggregation: AggregationType,
    ) -> Option<f64> {
        let idx = self.value_index(value_field)?;
        self.column_totals.get(&column)?.get(idx)?.compute(aggregation)
    }

    /// Aggregate over the entire record set.
    pub fn grand_total(&self, value_field: &str, aggregation: AggregationType) -> Option<f64> {
        let idx = self.value_index(value_field)?;
        self.grand_total.get(idx)?.compute(aggregation)
    }
}
