//! Categorical equality filtering with an "All" sentinel.

use crate::dataset::Dataset;
use crate::error::QueryResult;
use crate::schema::CategoricalColumn;
use polars::prelude::{col, lit};
use serde::Serialize;

/// Filter value meaning "do not filter".
pub const ALL: &str = "All";
/// The same sentinel as the crop selector displays it.
pub const ALL_CROPS: &str = "All Crops";

/// Which rows of a categorical column to keep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Selection {
    All,
    Value(String),
}

impl Selection {
    /// `"All"` and `"All Crops"` select everything; any other string is a label to match exactly.
    pub fn parse(value: &str) -> Self {
        if value == ALL || value == ALL_CROPS {
            Self::All
        } else {
            Self::Value(value.to_string())
        }
    }

    /// Display label, using `all_label` for the sentinel.
    pub fn label<'a>(&'a self, all_label: &'a str) -> &'a str {
        match self {
            Self::All => all_label,
            Self::Value(v) => v,
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Keep the records where `column == value`, in their original order.
///
/// `column` is a categorical identifier or source header (`crop`, `Season`, ...).
/// The sentinel returns `dataset` unchanged; no match returns an empty subset.
pub fn filter(dataset: &Dataset, column: &str, value: &str) -> QueryResult<Dataset> {
    let column: CategoricalColumn = column.parse()?;
    filter_by(dataset, column, &Selection::parse(value))
}

pub fn filter_by(
    dataset: &Dataset,
    column: CategoricalColumn,
    selection: &Selection,
) -> QueryResult<Dataset> {
    let value = match selection {
        Selection::All => return Ok(dataset.clone()),
        Selection::Value(v) => v.as_str(),
    };
    let df = dataset
        .lazy()
        .filter(col(column.header()).eq(lit(value)))
        .collect()?;
    tracing::debug!(
        column = column.ident(),
        value,
        rows = df.height(),
        "filtered dataset"
    );
    Ok(Dataset::from_schema_frame(df))
}
