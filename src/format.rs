//! Number formatting for reports and tables: rounding, units and the NaN placeholder.

use crate::schema::NumericColumn;
use serde::Serialize;
use std::fmt;

/// Rendered in place of NaN (statistic over zero rows, std of a single row).
pub const NOT_AVAILABLE: &str = "n/a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    None,
    Celsius,
    Millimetres,
    Percent,
    Rupees,
    YieldUnits,
    UnitsPerArea,
    Records,
}

impl Unit {
    pub fn of(column: NumericColumn) -> Self {
        match column {
            NumericColumn::Temperature => Self::Celsius,
            NumericColumn::Rainfall => Self::Millimetres,
            NumericColumn::Humidity => Self::Percent,
            NumericColumn::Yield => Self::YieldUnits,
            NumericColumn::Price => Self::Rupees,
        }
    }
}

/// A value with a unit and a fixed number of decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
    pub decimals: usize,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit, decimals: usize) -> Self {
        Self {
            value,
            unit,
            decimals,
        }
    }

    pub fn plain(value: f64, decimals: usize) -> Self {
        Self::new(value, Unit::None, decimals)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.value.is_finite() {
            return f.write_str(NOT_AVAILABLE);
        }
        let n = fixed(self.value, self.decimals);
        match self.unit {
            Unit::None => write!(f, "{n}"),
            Unit::Celsius => write!(f, "{n}°C"),
            Unit::Millimetres => write!(f, "{n} mm"),
            Unit::Percent => write!(f, "{n}%"),
            Unit::Rupees => write!(f, "₹{n}"),
            Unit::YieldUnits => write!(f, "{n} units"),
            Unit::UnitsPerArea => write!(f, "{n} units per area"),
            Unit::Records => write!(f, "{n} records"),
        }
    }
}

/// Fixed-point text with `decimals` places. Negative zero prints as zero.
pub fn fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let s = format!("{:.*}", decimals, value);
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

/// Round half away from zero to `decimals` places. NaN stays NaN.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Short label for a Pearson coefficient, e.g. "moderate positive".
pub fn correlation_strength(r: f64) -> &'static str {
    if !r.is_finite() {
        return "undetermined";
    }
    let a = r.abs();
    match (a, r >= 0.0) {
        (a, _) if a < 0.1 => "negligible",
        (a, true) if a < 0.4 => "weak positive",
        (a, false) if a < 0.4 => "weak negative",
        (a, true) if a < 0.7 => "moderate positive",
        (a, false) if a < 0.7 => "moderate negative",
        (_, true) => "strong positive",
        (_, false) => "strong negative",
    }
}
