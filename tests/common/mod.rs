#![allow(dead_code)]

use cropscope::{CategoricalColumn, Dataset, NumericColumn, Record};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

#[allow(clippy::too_many_arguments)]
pub fn record(
    crop: &str,
    season: &str,
    soil_type: &str,
    temperature: f64,
    rainfall: f64,
    humidity: f64,
    yield_: f64,
    price: f64,
) -> Record {
    Record {
        crop: crop.into(),
        season: season.into(),
        soil_type: soil_type.into(),
        temperature,
        rainfall,
        humidity,
        yield_,
        price,
    }
}

/// A small but varied crop season table: four crops, three seasons, three soils.
pub fn sample_records() -> Vec<Record> {
    vec![
        record("Rice", "Kharif", "clay", 28.0, 1200.0, 80.0, 3100.0, 1900.0),
        record("Wheat", "Rabi", "loamy", 18.0, 350.0, 55.0, 2600.0, 2150.0),
        record("Maize", "Kharif", "red", 26.0, 800.0, 65.0, 2800.0, 1750.0),
        record("Ragi", "Kharif", "red", 24.0, 700.0, 60.0, 1500.0, 3300.0),
        record("Rice", "Rabi", "clay", 24.0, 900.0, 75.0, 2900.0, 2000.0),
        record("Wheat", "Rabi", "black", 16.0, 300.0, 50.0, 2400.0, 2200.0),
        record("Maize", "Zaid", "loamy", 32.0, 400.0, 45.0, 2100.0, 1800.0),
        record("Rice", "Kharif", "loamy", 30.0, 1400.0, 85.0, 3300.0, 1950.0),
        record("Ragi", "Zaid", "red", 31.0, 450.0, 50.0, 1300.0, 3400.0),
        record("Wheat", "Kharif", "black", 22.0, 600.0, 60.0, 2000.0, 2100.0),
    ]
}

pub fn sample_dataset() -> Dataset {
    Dataset::from_records(&sample_records()).unwrap()
}

/// Write `records` as a CSV with the source headers into `dir`.
pub fn write_csv(dir: &Path, name: &str, records: &[Record], delimiter: u8) -> PathBuf {
    let text = |c: CategoricalColumn| -> Vec<String> {
        records.iter().map(|r| r.categorical(c).to_string()).collect()
    };
    let num = |n: NumericColumn| -> Vec<f64> { records.iter().map(|r| r.numeric(n)).collect() };
    let mut df = df!(
        "Crops" => text(CategoricalColumn::Crop),
        "Season" => text(CategoricalColumn::Season),
        "Soil type" => text(CategoricalColumn::SoilType),
        "Temperature" => num(NumericColumn::Temperature),
        "Rainfall" => num(NumericColumn::Rainfall),
        "Humidity" => num(NumericColumn::Humidity),
        "yeilds" => num(NumericColumn::Yield),
        "price" => num(NumericColumn::Price)
    )
    .unwrap();
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file)
        .with_separator(delimiter)
        .finish(&mut df)
        .unwrap();
    path
}
