//! FILENAME: tests/test_sort.rs
//! Integration tests for sorting and formatting computed pivots.

mod common;

use common::{column_key, SalesFixture};
use pivot_engine::{
    format_cell_value, generate_pivot, AggregationType, CellAddress, HeaderSort, PivotResult,
    SortDirection, SortKey, SortState,
};

fn region_by_product() -> PivotResult {
    generate_pivot(
        &SalesFixture::records(),
        &["Region"],
        &["Product"],
        &["Sales"],
        &[AggregationType::Sum, AggregationType::Average],
    )
    .unwrap()
}

fn row_labels(state: &SortState, result: &PivotResult) -> Vec<String> {
    state
        .apply(result)
        .rows()
        .map(|row| row.row_values[0].key_string())
        .collect()
}

#[test]
fn test_sort_rows_by_grand_total() {
    let result = region_by_product();
    let mut state = SortState::new();
    let key = SortKey::Cell(CellAddress::grand_total("Sales", AggregationType::Sum));

    state.toggle_key(key.clone());
    assert_eq!(row_labels(&state, &result), vec!["East", "North", "South"]);

    state.toggle_key(key);
    assert_eq!(state.direction, SortDirection::Descending);
    assert_eq!(row_labels(&state, &result), vec!["South", "North", "East"]);
}

#[test]
fn test_sort_rows_by_column_cell() {
    let result = region_by_product();
    let mut state = SortState::new();
    let gadget = column_key("Gadget");

    state.sort_by(
        SortKey::Cell(CellAddress::new(gadget.as_str(), "Sales", AggregationType::Average)),
        SortDirection::Descending,
    );
    assert_eq!(row_labels(&state, &result), vec!["South", "North", "East"]);
}

#[test]
fn test_all_ties_keep_computed_order() {
    let result = generate_pivot(
        &SalesFixture::records(),
        &["Region"],
        &[],
        &["Quarter"],
        &[AggregationType::Count],
    )
    .unwrap();
    let mut state = SortState::new();

    for direction in [SortDirection::Ascending, SortDirection::Descending] {
        state.sort_by(
            SortKey::Cell(CellAddress::new("total", "Quarter", AggregationType::Count)),
            direction,
        );
        assert_eq!(row_labels(&state, &result), vec!["North", "South", "East"]);
    }
}

#[test]
fn test_header_indicators_cycle_independently() {
    let result = region_by_product();
    let mut state = SortState::new();

    assert_eq!(state.cycle_column_header(), HeaderSort::Ascending);
    assert_eq!(state.cycle_row_header(), HeaderSort::Ascending);
    assert_eq!(state.cycle_row_header(), HeaderSort::Descending);

    let view = state.apply(&result);
    let columns: Vec<&str> = view.column_headers().map(|h| h.key.as_str()).collect();
    assert_eq!(columns, vec![r#"["Gadget"]"#, r#"["Widget"]"#]);
    assert_eq!(row_labels(&state, &result), vec!["South", "North", "East"]);

    assert_eq!(state.cycle_row_header(), HeaderSort::Unsorted);
    assert_eq!(row_labels(&state, &result), vec!["North", "South", "East"]);
    assert_eq!(state.column_header, HeaderSort::Ascending);
}

#[test]
fn test_sorted_view_formats_cells() {
    let result = region_by_product();
    let mut state = SortState::new();
    state.sort_by(SortKey::RowField(0), SortDirection::Ascending);

    let address = CellAddress::grand_total("Sales", AggregationType::Average);
    let formatted: Vec<String> = state
        .apply(&result)
        .rows()
        .map(|row| format_cell_value(row.cell(&address), address.aggregation))
        .collect();

    // East: 35500 / 4, North: 39000 / 4, South: 53000 / 4
    assert_eq!(formatted, vec!["8,875.00", "9,750.00", "13,250.00"]);
}
