//! User-facing error message formatting.
//!
//! Uses typed error matching (LoadError/QueryError variants, PolarsError variants,
//! io::ErrorKind) rather than string parsing.

use crate::error::{LoadError, QueryError};
use polars::prelude::PolarsError;
use std::io;
use std::path::Path;

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!("Column not found: {}.", msg),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!("Row shape mismatch: {}", msg),
        PE::InvalidOperation(msg) => format!("Operation not allowed: {}", msg),
        PE::ComputeError(msg) => first_line(msg),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => first_line(&err.to_string()),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::Interrupted => "Operation interrupted.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Message for a failed dataset load.
pub fn user_message_from_load(err: &LoadError) -> String {
    match err {
        LoadError::NotFound(path) => format!(
            "Dataset not found: {}. Pass a PATH or set data.path in the config file.",
            path.display()
        ),
        LoadError::MissingColumn(header) => format!(
            "Required column '{}' is missing. Expected columns: Crops, Season, Soil type, \
             Temperature, Rainfall, Humidity, yeilds, price.",
            header
        ),
        LoadError::InvalidColumnType { column, dtype } => format!(
            "Column '{}' must be numeric but was read as {}.",
            column, dtype
        ),
        LoadError::Malformed(pe) => user_message_from_polars(pe),
    }
}

/// Message for a failed query. Empty results read as "nothing to show" rather than a failure.
pub fn user_message_from_query(err: &QueryError) -> String {
    match err {
        QueryError::UnknownColumn(name) => format!("Unknown column: {}", name),
        QueryError::EmptyResult => "No records match the current selection.".to_string(),
        QueryError::StatisticNotComputed(stat) => {
            format!("Statistic '{}' was not computed for this result.", stat)
        }
        QueryError::Polars(pe) => user_message_from_polars(pe),
    }
}

/// Format a color_eyre Report by downcasting to known error types.
/// Walks the cause chain to find LoadError, QueryError, PolarsError or io::Error.
pub fn user_message_from_report(report: &color_eyre::eyre::Report, path: Option<&Path>) -> String {
    let with_path = |msg: String| match path {
        Some(p) => format!("Failed to load {}: {}", p.display(), msg),
        None => msg,
    };

    for cause in report.chain() {
        if let Some(le) = cause.downcast_ref::<LoadError>() {
            // Load messages already name the file or column.
            return user_message_from_load(le);
        }
        if let Some(qe) = cause.downcast_ref::<QueryError>() {
            return user_message_from_query(qe);
        }
        if let Some(pe) = cause.downcast_ref::<PolarsError>() {
            return with_path(user_message_from_polars(pe));
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return with_path(user_message_from_io(io_err, None));
        }
    }

    // Fallback: first line of display to avoid long tracebacks
    with_path(first_line(&report.to_string()))
}

fn first_line(msg: &str) -> String {
    msg.lines()
        .next()
        .map(str::trim)
        .unwrap_or("An error occurred")
        .to_string()
}
