//! FILENAME: core/records/src/lib.rs
//! PURPOSE: Source-data layer shared by the pivot engine.
//! CONTEXT: Holds the record model handed over by the upload/parse step,
//! the scalar coercions used by grouping and aggregation, date conversion,
//! and field type inference.

pub mod cell;
pub mod date;
pub mod field_type;
pub mod record;

pub use cell::{CellValue, EMPTY};
pub use date::{
    is_date_text, is_serial_date, parse_date_text, serial_to_date, to_date, SERIAL_DATE_MAX,
    SERIAL_DATE_MIN,
};
pub use field_type::{detect_field_type, detect_field_types, FieldType, TYPE_SAMPLE_SIZE};
pub use record::{Record, RecordSet};
