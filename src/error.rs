//! Error type shared by the frame model and the reduction engine.

use thiserror::Error;

use crate::dtype::DType;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReduceError {
    #[error("Column '{column}' has no observed values")]
    EmptyColumn { column: String },
    #[error("Column '{column}' is {dtype} and has no numeric range")]
    NotNumeric { column: String, dtype: DType },
    #[error("Margin must be a finite, non-negative number (got {0})")]
    InvalidMargin(f64),
    #[error("Column '{column}' holds values that do not fit in {dtype}")]
    CastOverflow { column: String, dtype: DType },
    #[error("Column '{column}' cannot be converted to {dtype}")]
    UnsupportedCast { column: String, dtype: DType },
    #[error("Column '{column}' cannot be rounded to integers")]
    RoundingFailed { column: String },
    #[error("Column '{column}' has {actual} row(s) but the frame expects {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("Column '{0}' already exists in the frame")]
    DuplicateColumn(String),
    #[error("Column '{0}' not found in the frame")]
    UnknownColumn(String),
}

/// Raised by a datetime probe when a cell does not parse as a date or time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Column has no values to probe")]
    NoValues,
    #[error("'{0}' is not a recognised date or datetime")]
    Unparseable(String),
}
