use polars::prelude::{DataType, PolarsError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure to bring the dataset into memory. Fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("expected column '{0}' is missing from the data file")]
    MissingColumn(&'static str),
    #[error("column '{column}' must be numeric, found {dtype}")]
    InvalidColumnType {
        column: &'static str,
        dtype: DataType,
    },
    #[error("malformed data file: {0}")]
    Malformed(#[from] PolarsError),
}

/// Failure of a single filter/aggregate/report call. Never affects the loaded dataset.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown column: '{0}'")]
    UnknownColumn(String),
    #[error("no groups to choose from")]
    EmptyResult,
    #[error("statistic '{0}' was not computed for this result")]
    StatisticNotComputed(&'static str),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;
