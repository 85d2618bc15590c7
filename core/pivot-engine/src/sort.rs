//! FILENAME: core/pivot-engine/src/sort.rs
//! Sort Layer - Presentation ordering over an already-computed pivot.
//!
//! Sorting never touches aggregate values. It produces index permutations
//! over `PivotResult::rows` and `PivotResult::column_headers`; the computed
//! order is always recoverable by returning to the unsorted state.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use records::CellValue;

use crate::view::{CellAddress, ColumnHeader, PivotResult, PivotRow};

/// Direction of the active sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Tri-state indicator of a header group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderSort {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

impl HeaderSort {
    /// Ascending -> descending -> unsorted -> ascending.
    pub fn next(self) -> Self {
        match self {
            HeaderSort::Unsorted => HeaderSort::Ascending,
            HeaderSort::Ascending => HeaderSort::Descending,
            HeaderSort::Descending => HeaderSort::Unsorted,
        }
    }

    fn direction(self) -> Option<SortDirection> {
        match self {
            HeaderSort::Unsorted => None,
            HeaderSort::Ascending => Some(SortDirection::Ascending),
            HeaderSort::Descending => Some(SortDirection::Descending),
        }
    }
}

/// What rows are ordered by.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    None,
    /// Position within `row_values`.
    RowField(usize),
    /// One aggregate cell of each row.
    Cell(CellAddress),
}

/// Sort configuration, held apart from the pivot data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
    pub row_header: HeaderSort,
    pub column_header: HeaderSort,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `key` the active key. Resets the row-header indicator.
    pub fn sort_by(&mut self, key: SortKey, direction: SortDirection) {
        self.key = key;
        self.direction = direction;
        self.row_header = HeaderSort::Unsorted;
    }

    /// Selects `key`, flipping the direction when it is already active.
    pub fn toggle_key(&mut self, key: SortKey) {
        let direction = if self.key == key {
            self.direction.reversed()
        } else {
            SortDirection::Ascending
        };
        self.sort_by(key, direction);
    }

    /// Advances the row-label indicator and clears the active key.
    pub fn cycle_row_header(&mut self) -> HeaderSort {
        self.key = SortKey::None;
        self.direction = SortDirection::Ascending;
        self.row_header = self.row_header.next();
        self.row_header
    }

    /// Advances the column-label indicator.
    pub fn cycle_column_header(&mut self) -> HeaderSort {
        self.column_header = self.column_header.next();
        self.column_header
    }

    pub fn clear(&mut self) {
        *self = SortState::default();
    }

    /// Permutation of `result.rows` in display order.
    pub fn row_order(&self, result: &PivotResult) -> Vec<usize> {
        let mut order: Vec<usize> = (0..result.rows.len()).collect();

        match &self.key {
            SortKey::None => {
                if let Some(direction) = self.row_header.direction() {
                    sort_indices(&mut order, direction, |i| &result.rows[i].row_values[..], |a, b| {
                        compare_tuples(a, b)
                    });
                }
            }
            SortKey::RowField(position) => {
                let keys: Vec<&CellValue> = result
                    .rows
                    .iter()
                    .map(|row| row.row_values.get(*position).unwrap_or(records::EMPTY))
                    .collect();
                sort_indices(&mut order, self.direction, |i| keys[i], compare_values);
            }
            SortKey::Cell(address) => {
                let keys: Vec<CellValue> = result
                    .rows
                    .iter()
                    .map(|row| CellValue::from(row.cell(address)))
                    .collect();
                sort_indices(&mut order, self.direction, |i| &keys[i], compare_values);
            }
        }

        order
    }

    /// Permutation of `result.column_headers` in display order.
    pub fn column_order(&self, result: &PivotResult) -> Vec<usize> {
        let mut order: Vec<usize> = (0..result.column_headers.len()).collect();
        if let Some(direction) = self.column_header.direction() {
            sort_indices(
                &mut order,
                direction,
                |i| &result.column_headers[i].values[..],
                |a, b| compare_tuples(a, b),
            );
        }
        order
    }

    /// A reordered view over `result`.
    pub fn apply<'a>(&self, result: &'a PivotResult) -> SortedPivot<'a> {
        SortedPivot {
            result,
            row_order: self.row_order(result),
            column_order: self.column_order(result),
        }
    }
}

/// Stable sort of `order` by the key each index maps to.
fn sort_indices<'k, K: ?Sized + 'k>(
    order: &mut [usize],
    direction: SortDirection,
    key: impl Fn(usize) -> &'k K,
    compare: impl Fn(&K, &K) -> Ordering,
) {
    match direction {
        SortDirection::Ascending => order.sort_by(|&a, &b| compare(key(a), key(b))),
        SortDirection::Descending => order.sort_by(|&a, &b| compare(key(b), key(a))),
    }
}

/// Nulls first, numbers numerically, everything else by its string form.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Empty, CellValue::Empty) => Ordering::Equal,
        (CellValue::Empty, _) => Ordering::Less,
        (_, CellValue::Empty) => Ordering::Greater,
        (CellValue::Number(x), CellValue::Number(y)) => x.total_cmp(y),
        _ => a.key_string().cmp(&b.key_string()),
    }
}

fn compare_tuples(a: &[CellValue], b: &[CellValue]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| compare_values(x, y))
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

// ============================================================================
// SORTED VIEW
// ============================================================================

/// A pivot result seen through row and column permutations.
#[derive(Debug, Clone)]
pub struct SortedPivot<'a> {
    pub result: &'a PivotResult,
    pub row_order: Vec<usize>,
    pub column_order: Vec<usize>,
}

impl<'a> SortedPivot<'a> {
    pub fn rows(&self) -> impl Iterator<Item = &'a PivotRow> + '_ {
        self.row_order.iter().map(move |&i| &self.result.rows[i])
    }

    pub fn column_headers(&self) -> impl Iterator<Item = &'a ColumnHeader> + '_ {
        self.column_order
            .iter()
            .map(move |&i| &self.result.column_headers[i])
    }
}
