//! Typed record schema and the fixed column identifiers of the crop season dataset.

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub crop: String,
    pub season: String,
    pub soil_type: String,
    pub temperature: f64,
    pub rainfall: f64,
    pub humidity: f64,
    #[serde(rename = "yield")]
    pub yield_: f64,
    pub price: f64,
}

impl Record {
    pub fn categorical(&self, column: CategoricalColumn) -> &str {
        match column {
            CategoricalColumn::Crop => &self.crop,
            CategoricalColumn::Season => &self.season,
            CategoricalColumn::SoilType => &self.soil_type,
        }
    }

    pub fn numeric(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::Temperature => self.temperature,
            NumericColumn::Rainfall => self.rainfall,
            NumericColumn::Humidity => self.humidity,
            NumericColumn::Yield => self.yield_,
            NumericColumn::Price => self.price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalColumn {
    Crop,
    Season,
    SoilType,
}

impl CategoricalColumn {
    pub const ALL: [Self; 3] = [Self::Crop, Self::Season, Self::SoilType];

    /// Header of this column in the source file.
    pub fn header(self) -> &'static str {
        match self {
            Self::Crop => "Crops",
            Self::Season => "Season",
            Self::SoilType => "Soil type",
        }
    }

    pub fn ident(self) -> &'static str {
        match self {
            Self::Crop => "crop",
            Self::Season => "season",
            Self::SoilType => "soil_type",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Crop => "Crop",
            Self::Season => "Season",
            Self::SoilType => "Soil Type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    Temperature,
    Rainfall,
    Humidity,
    Yield,
    Price,
}

impl NumericColumn {
    pub const ALL: [Self; 5] = [
        Self::Temperature,
        Self::Rainfall,
        Self::Humidity,
        Self::Yield,
        Self::Price,
    ];

    /// Header of this column in the source file. `yeilds` is spelled as the source spells it.
    pub fn header(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Rainfall => "Rainfall",
            Self::Humidity => "Humidity",
            Self::Yield => "yeilds",
            Self::Price => "price",
        }
    }

    pub fn ident(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Rainfall => "rainfall",
            Self::Humidity => "humidity",
            Self::Yield => "yield",
            Self::Price => "price",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Rainfall => "Rainfall",
            Self::Humidity => "Humidity",
            Self::Yield => "Yield",
            Self::Price => "Price",
        }
    }

    /// Axis title with unit, e.g. "Temperature (°C)".
    pub fn axis_title(self) -> String {
        match self {
            Self::Temperature => "Temperature (°C)".to_string(),
            Self::Rainfall => "Rainfall (mm)".to_string(),
            Self::Humidity => "Humidity (%)".to_string(),
            Self::Yield => "Yield".to_string(),
            Self::Price => "Price (₹)".to_string(),
        }
    }
}

/// Any column of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Categorical(CategoricalColumn),
    Numeric(NumericColumn),
}

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Self::Categorical(c) => c.header(),
            Self::Numeric(n) => n.header(),
        }
    }

    /// Every column in source order.
    pub fn all() -> impl Iterator<Item = Column> {
        CategoricalColumn::ALL
            .into_iter()
            .map(Column::Categorical)
            .chain(NumericColumn::ALL.into_iter().map(Column::Numeric))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Accepts either the snake_case identifier (`soil_type`) or the source header (`Soil type`).
impl FromStr for Column {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        for c in CategoricalColumn::ALL {
            if s == c.ident() || s == c.header() {
                return Ok(Column::Categorical(c));
            }
        }
        for n in NumericColumn::ALL {
            if s == n.ident() || s == n.header() {
                return Ok(Column::Numeric(n));
            }
        }
        Err(QueryError::UnknownColumn(s.to_string()))
    }
}

impl FromStr for CategoricalColumn {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Column>()? {
            Column::Categorical(c) => Ok(c),
            Column::Numeric(_) => Err(QueryError::UnknownColumn(s.trim().to_string())),
        }
    }
}

impl FromStr for NumericColumn {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Column>()? {
            Column::Numeric(n) => Ok(n),
            Column::Categorical(_) => Err(QueryError::UnknownColumn(s.trim().to_string())),
        }
    }
}
