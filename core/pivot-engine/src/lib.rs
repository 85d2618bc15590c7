//! FILENAME: core/pivot-engine/src/lib.rs
//! Pivot table calculation engine.
//!
//! Turns a flat `RecordSet` plus a `PivotDefinition` into a cross-tabulation
//! with per-cell aggregates, row grand totals, column grand totals and an
//! overall grand total. It depends on `records` for the source data model.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the pivot table IS)
//! - `hierarchy`: Derived date fields and field value resolution
//! - `cache`: Grouping and accumulators (HOW we compute)
//! - `view`: The computed result (WHAT we display)
//! - `engine`: Calculation engine (HOW we calculate)
//! - `sort`: Presentation ordering over a computed result
//! - `format`: Display strings for cells and date values

pub mod definition;
pub mod error;
pub mod hierarchy;
pub mod cache;
pub mod view;
pub mod engine;
pub mod sort;
pub mod format;

pub use definition::*;
pub use error::{PivotError, Result};
pub use hierarchy::{
    date_hierarchy_fields, date_part_value, format_date_level_name, format_date_part,
    resolve_field, FieldCatalog, FieldOption,
};
pub use cache::{aggregate, group_key_equals, unique_tuples, AggregateAccumulator, KeyTuple};
pub use view::*;
pub use engine::{calculate_pivot, generate_pivot, recombine_cells, PivotCalculator};
pub use sort::{compare_values, HeaderSort, SortDirection, SortKey, SortState, SortedPivot};
pub use format::{format_cell_value, format_date_value};
