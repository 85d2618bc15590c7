//! FILENAME: core/pivot-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PivotError {
    #[error("Unknown aggregation: {0}")]
    UnknownAggregation(String),

    #[error("Empty field identifier")]
    EmptyFieldId,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PivotError>;
