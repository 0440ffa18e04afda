//! Prepare chart data from a Dataset: scatter points grouped by season and key → value bars.
//!
//! Everything here is plain data; the dashboard draws it with ratatui and `chart_export`
//! renders it with plotters.

use crate::aggregate::{aggregate_by, rank, stats_table, Order, StatSet, Statistic, StatsRow};
use crate::dataset::Dataset;
use crate::error::QueryResult;
use crate::filter::{filter_by, Selection, ALL_CROPS};
use crate::schema::{CategoricalColumn, NumericColumn};
use serde::Serialize;

/// One record as a scatter point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// Temperature.
    pub x: f64,
    /// Yield.
    pub y: f64,
    /// Season label (series key).
    pub color: String,
    /// Rainfall, drawn as marker size.
    pub size: f64,
    pub humidity: f64,
    pub soil_type: String,
}

/// Points sharing one color key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<ScatterPoint>,
}

/// Bounds over all finite points, for axis setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Series in first-appearance order of their season.
    pub series: Vec<ScatterSeries>,
}

impl ScatterData {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    /// `None` when there are no points.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.series.iter().flat_map(|s| s.points.iter());
        let first = points.next()?;
        let init = Bounds {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };
        Some(points.fold(init, |b, p| Bounds {
            x_min: b.x_min.min(p.x),
            x_max: b.x_max.max(p.x),
            y_min: b.y_min.min(p.y),
            y_max: b.y_max.max(p.y),
        }))
    }
}

/// Labelled bars, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<(String, f64)>,
}

impl BarData {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Largest finite bar value, 0 when there is none.
    pub fn max_value(&self) -> f64 {
        self.bars
            .iter()
            .map(|(_, v)| *v)
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }
}

/// Temperature vs yield for the selected crop (all records for the sentinel), colored by
/// season and sized by rainfall. Rows with a non-finite x or y are skipped.
pub fn yield_scatter(dataset: &Dataset, crop: &Selection) -> QueryResult<ScatterData> {
    let subset = filter_by(dataset, CategoricalColumn::Crop, crop)?;
    let records = subset.records()?;

    let mut series: Vec<ScatterSeries> = Vec::new();
    for r in records
        .into_iter()
        .filter(|r| r.temperature.is_finite() && r.yield_.is_finite())
    {
        let point = ScatterPoint {
            x: r.temperature,
            y: r.yield_,
            color: r.season.clone(),
            size: r.rainfall,
            humidity: r.humidity,
            soil_type: r.soil_type,
        };
        match series.iter_mut().find(|s| s.name == r.season) {
            Some(s) => s.points.push(point),
            None => series.push(ScatterSeries {
                name: r.season,
                points: vec![point],
            }),
        }
    }

    Ok(ScatterData {
        title: format!("Yield Analysis for {}", crop.label(ALL_CROPS)),
        x_label: NumericColumn::Temperature.axis_title().to_string(),
        y_label: NumericColumn::Yield.axis_title().to_string(),
        series,
    })
}

/// Mean of `value` per `group_by` label, highest first.
fn mean_bars(
    dataset: &Dataset,
    group_by: CategoricalColumn,
    value: NumericColumn,
) -> QueryResult<Vec<(String, f64)>> {
    let result = aggregate_by(dataset, group_by, value, StatSet::of(&[Statistic::Mean]))?;
    rank(&result, Statistic::Mean, result.len(), Order::Descending)
}

/// Average yield per crop within one season. An unknown season gives no bars.
pub fn seasonal_pattern(dataset: &Dataset, season: &str) -> QueryResult<BarData> {
    let subset = filter_by(
        dataset,
        CategoricalColumn::Season,
        &Selection::Value(season.to_string()),
    )?;
    Ok(BarData {
        title: format!("Average Yield by Crop in {season} Season"),
        x_label: CategoricalColumn::Crop.label().to_string(),
        y_label: "Average Yield".to_string(),
        bars: mean_bars(&subset, CategoricalColumn::Crop, NumericColumn::Yield)?,
    })
}

/// Average price per crop over the whole dataset.
pub fn price_trends(dataset: &Dataset) -> QueryResult<BarData> {
    Ok(BarData {
        title: "Average Price by Crop".to_string(),
        x_label: CategoricalColumn::Crop.label().to_string(),
        y_label: "Average Price (₹)".to_string(),
        bars: mean_bars(dataset, CategoricalColumn::Crop, NumericColumn::Price)?,
    })
}

/// Price mean/min/max/std per crop, rounded to two decimals.
pub fn price_statistics(dataset: &Dataset) -> QueryResult<Vec<StatsRow>> {
    let result = aggregate_by(
        dataset,
        CategoricalColumn::Crop,
        NumericColumn::Price,
        StatSet::of(&[Statistic::Mean, Statistic::Min, Statistic::Max, Statistic::Std]),
    )?;
    stats_table(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Record;

    fn record(crop: &str, season: &str, temperature: f64, yield_: f64, price: f64) -> Record {
        Record {
            crop: crop.into(),
            season: season.into(),
            soil_type: "loamy".into(),
            temperature,
            rainfall: 500.0,
            humidity: 60.0,
            yield_,
            price,
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_records(&[
            record("Rice", "Kharif", 30.0, 100.0, 1800.0),
            record("Wheat", "Rabi", 18.0, 50.0, 2200.0),
            record("Rice", "Rabi", 22.0, 200.0, 2000.0),
            record("Maize", "Kharif", 26.0, 80.0, 1500.0),
            record("Rice", "Kharif", f64::NAN, 90.0, 1900.0),
        ])
        .unwrap()
    }

    #[test]
    fn scatter_groups_by_season_in_appearance_order() {
        let data = yield_scatter(&dataset(), &Selection::parse("Rice")).unwrap();
        assert_eq!(data.title, "Yield Analysis for Rice");
        let names: Vec<&str> = data.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Kharif", "Rabi"]);
        // NaN temperature row is skipped
        assert_eq!(data.point_count(), 2);
        assert_eq!(data.series[0].points[0].x, 30.0);
        assert_eq!(data.series[0].points[0].size, 500.0);
    }

    #[test]
    fn scatter_all_crops() {
        let data = yield_scatter(&dataset(), &Selection::All).unwrap();
        assert_eq!(data.title, "Yield Analysis for All Crops");
        assert_eq!(data.point_count(), 4);
        let b = data.bounds().unwrap();
        assert_eq!((b.x_min, b.x_max), (18.0, 30.0));
        assert_eq!((b.y_min, b.y_max), (50.0, 200.0));
    }

    #[test]
    fn scatter_keeps_every_record() {
        let records: Vec<Record> = (0..12_000)
            .map(|i| {
                let season = if i % 2 == 0 { "Kharif" } else { "Rabi" };
                record("Rice", season, 20.0 + (i % 15) as f64, i as f64, 1900.0)
            })
            .collect();
        let ds = Dataset::from_records(&records).unwrap();
        let data = yield_scatter(&ds, &Selection::All).unwrap();
        assert_eq!(data.point_count(), ds.height());
        assert_eq!(data.series[1].points.len(), 6_000);
        let b = data.bounds().unwrap();
        assert_eq!((b.y_min, b.y_max), (0.0, 11_999.0));
    }

    #[test]
    fn scatter_unknown_crop_is_empty() {
        let data = yield_scatter(&dataset(), &Selection::parse("Cotton")).unwrap();
        assert!(data.is_empty());
        assert!(data.bounds().is_none());
    }

    #[test]
    fn seasonal_pattern_sorted_descending() {
        let bars = seasonal_pattern(&dataset(), "Kharif").unwrap();
        assert_eq!(bars.title, "Average Yield by Crop in Kharif Season");
        assert_eq!(
            bars.bars,
            vec![("Rice".to_string(), 95.0), ("Maize".to_string(), 80.0)]
        );
        assert_eq!(bars.max_value(), 95.0);
        assert!(seasonal_pattern(&dataset(), "Zaid").unwrap().is_empty());
    }

    #[test]
    fn price_trends_and_statistics() {
        let ds = dataset();
        let trends = price_trends(&ds).unwrap();
        let keys: Vec<&str> = trends.bars.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Wheat", "Rice", "Maize"]);

        let stats = price_statistics(&ds).unwrap();
        assert_eq!(stats[0].key, "Wheat");
        assert!(stats[0].std.is_nan());
        assert_eq!(stats[1].key, "Rice");
        assert_eq!(stats[1].mean, 1900.0);
        assert_eq!(stats[1].std, 100.0);
    }
}
