//! FILENAME: core/records/src/record.rs
//! PURPOSE: Ordered, immutable collection of source records.
//! CONTEXT: Values are stored row-major by field position. The field catalog
//! (the selectable field names) is taken from the first record; keys that only
//! appear on later records are still addressable by name.

use rustc_hash::FxHashMap;

use crate::cell::{CellValue, EMPTY};

/// An ordered sequence of homogeneous records.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    /// Every field name seen, in first-seen order.
    fields: Vec<String>,

    /// Map from field name to its position in `fields`.
    field_index: FxHashMap<String, usize>,

    /// Number of leading `fields` that came from the first record.
    catalog_len: usize,

    /// Record values, indexed by field position. Rows may be shorter than
    /// `fields` when a later record introduced a new key.
    rows: Vec<Vec<CellValue>>,
}

impl RecordSet {
    /// Creates an empty record set with a fixed field catalog.
    pub fn new(fields: Vec<String>) -> Self {
        let mut set = RecordSet::default();
        for name in fields {
            set.intern_field(name);
        }
        set.catalog_len = set.fields.len();
        set
    }

    /// Builds a record set from column names plus positional rows.
    pub fn from_rows(fields: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut set = RecordSet::new(fields);
        set.rows = rows;
        set
    }

    /// Builds a record set from records given as ordered `(name, value)` pairs.
    /// The first record defines the catalog.
    pub fn from_records<I, R, K>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, CellValue)>,
        K: Into<String>,
    {
        let mut set = RecordSet::default();

        for (record_idx, record) in records.into_iter().enumerate() {
            let mut values: Vec<CellValue> = Vec::with_capacity(set.fields.len());
            for (name, value) in record {
                let position = set.intern_field(name.into());
                if values.len() <= position {
                    values.resize(position + 1, CellValue::Empty);
                }
                values[position] = value;
            }
            if record_idx == 0 {
                set.catalog_len = set.fields.len();
            }
            set.rows.push(values);
        }

        set
    }

    /// Appends one record in field order.
    pub fn push_row(&mut self, values: Vec<CellValue>) {
        self.rows.push(values);
    }

    fn intern_field(&mut self, name: String) -> usize {
        if let Some(&position) = self.field_index.get(&name) {
            return position;
        }
        let position = self.fields.len();
        self.field_index.insert(name.clone(), position);
        self.fields.push(name);
        position
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Field names of the first record, in order.
    pub fn field_names(&self) -> &[String] {
        &self.fields[..self.catalog_len]
    }

    /// Position of a field, including fields outside the catalog.
    pub fn field_position(&self, name: &str) -> Option<usize> {
        self.field_index.get(name).copied()
    }

    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        self.rows.get(index).map(|values| Record { set: self, values })
    }

    pub fn iter(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        self.rows.iter().map(move |values| Record { set: self, values })
    }
}

/// A borrowed view of one record.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    set: &'a RecordSet,
    values: &'a [CellValue],
}

impl<'a> Record<'a> {
    /// Value of a named field; absent fields read as `CellValue::Empty`.
    pub fn get(&self, name: &str) -> &'a CellValue {
        self.set
            .field_position(name)
            .map_or(EMPTY, |position| self.get_at(position))
    }

    /// Value at a field position; out-of-range positions read as empty.
    pub fn get_at(&self, position: usize) -> &'a CellValue {
        self.values.get(position).unwrap_or(EMPTY)
    }
}
