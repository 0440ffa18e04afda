//! In-memory crop season dataset: loaded once from a delimited file, read-only afterwards.

use crate::error::{LoadError, QueryResult};
use crate::schema::{CategoricalColumn, NumericColumn, Record};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Options for reading the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// An ordered, immutable collection of records.
///
/// Holds exactly the eight schema columns: categoricals as `String`, numerics as `Float64`.
/// Subsets produced by filtering are themselves `Dataset`s; cloning is cheap (columns are shared).
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
}

impl Dataset {
    /// Read a delimited file with a header row.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let delimiter = options.delimiter;
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .map_parse_options(|opts| opts.with_separator(delimiter))
            .try_into_reader_with_file_path(Some(path.into()))?
            .finish()?;
        let dataset = Self::from_frame(df)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.height(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Project and type-check a raw frame. Headers are matched after trimming surrounding
    /// whitespace; extra columns are dropped.
    pub fn from_frame(df: DataFrame) -> Result<Self, LoadError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        let find = |header: &'static str| -> Result<&String, LoadError> {
            names
                .iter()
                .find(|n| n.trim() == header)
                .ok_or(LoadError::MissingColumn(header))
        };

        let mut exprs = Vec::with_capacity(CategoricalColumn::ALL.len() + NumericColumn::ALL.len());
        for c in CategoricalColumn::ALL {
            let source = find(c.header())?;
            exprs.push(
                col(source.as_str())
                    .cast(DataType::String)
                    .alias(c.header()),
            );
        }
        for n in NumericColumn::ALL {
            let source = find(n.header())?;
            let dtype = df.column(source.as_str())?.dtype();
            if !dtype.is_numeric() {
                return Err(LoadError::InvalidColumnType {
                    column: n.header(),
                    dtype: dtype.clone(),
                });
            }
            exprs.push(
                col(source.as_str())
                    .cast(DataType::Float64)
                    .alias(n.header()),
            );
        }

        let df = df.lazy().select(exprs).collect()?;
        Ok(Self { df })
    }

    /// Build a dataset from typed records (used by fixtures and embedding callers).
    pub fn from_records(records: &[Record]) -> Result<Self, LoadError> {
        let text = |c: CategoricalColumn| -> Vec<String> {
            records
                .iter()
                .map(|r| r.categorical(c).to_string())
                .collect()
        };
        let num = |n: NumericColumn| -> Vec<f64> { records.iter().map(|r| r.numeric(n)).collect() };
        let df = df!(
            CategoricalColumn::Crop.header() => text(CategoricalColumn::Crop),
            CategoricalColumn::Season.header() => text(CategoricalColumn::Season),
            CategoricalColumn::SoilType.header() => text(CategoricalColumn::SoilType),
            NumericColumn::Temperature.header() => num(NumericColumn::Temperature),
            NumericColumn::Rainfall.header() => num(NumericColumn::Rainfall),
            NumericColumn::Humidity.header() => num(NumericColumn::Humidity),
            NumericColumn::Yield.header() => num(NumericColumn::Yield),
            NumericColumn::Price.header() => num(NumericColumn::Price)
        )?;
        Self::from_frame(df)
    }

    /// Wrap a frame already in schema shape (output of a filter over a `Dataset`).
    pub(crate) fn from_schema_frame(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }

    pub(crate) fn text_values(&self, column: CategoricalColumn) -> QueryResult<&StringChunked> {
        Ok(self
            .df
            .column(column.header())?
            .as_materialized_series()
            .str()?)
    }

    pub(crate) fn numeric_values(&self, column: NumericColumn) -> QueryResult<&Float64Chunked> {
        Ok(self
            .df
            .column(column.header())?
            .as_materialized_series()
            .f64()?)
    }

    /// Distinct labels of a categorical column, sorted ascending (selector choices).
    pub fn distinct(&self, column: CategoricalColumn) -> QueryResult<Vec<String>> {
        let values = self.text_values(column)?;
        let set: BTreeSet<&str> = values.iter().flatten().collect();
        Ok(set.into_iter().map(str::to_string).collect())
    }

    /// Materialize typed rows in dataset order. Nulls read as "" / NaN.
    pub fn records(&self) -> QueryResult<Vec<Record>> {
        let crop = self.text_values(CategoricalColumn::Crop)?;
        let season = self.text_values(CategoricalColumn::Season)?;
        let soil = self.text_values(CategoricalColumn::SoilType)?;
        let temperature = self.numeric_values(NumericColumn::Temperature)?;
        let rainfall = self.numeric_values(NumericColumn::Rainfall)?;
        let humidity = self.numeric_values(NumericColumn::Humidity)?;
        let yield_ = self.numeric_values(NumericColumn::Yield)?;
        let price = self.numeric_values(NumericColumn::Price)?;

        Ok((0..self.height())
            .map(|i| Record {
                crop: crop.get(i).unwrap_or_default().to_string(),
                season: season.get(i).unwrap_or_default().to_string(),
                soil_type: soil.get(i).unwrap_or_default().to_string(),
                temperature: temperature.get(i).unwrap_or(f64::NAN),
                rainfall: rainfall.get(i).unwrap_or(f64::NAN),
                humidity: humidity.get(i).unwrap_or(f64::NAN),
                yield_: yield_.get(i).unwrap_or(f64::NAN),
                price: price.get(i).unwrap_or(f64::NAN),
            })
            .collect())
    }
}

/// Sole owner of the loaded dataset for the process lifetime.
#[derive(Debug)]
pub struct DatasetStore {
    source: PathBuf,
    dataset: Dataset,
}

impl DatasetStore {
    pub fn open(path: &Path, options: &LoadOptions) -> Result<Self, LoadError> {
        let dataset = Dataset::load(path, options)?;
        Ok(Self {
            source: path.to_path_buf(),
            dataset,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}
