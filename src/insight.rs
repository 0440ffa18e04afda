//! Human-readable insight reports.
//!
//! Reports are assembled from aggregation results with [`ReportBuilder`] and rendered either as
//! plain text (crop details) or markdown (key findings). Numbers are formatted through
//! [`Quantity`], never interpolated directly.

use crate::aggregate::{
    aggregate_by, best_group, correlation, rank, summarize, value_counts, Order, StatSet,
    Statistic,
};
use crate::dataset::Dataset;
use crate::error::{QueryError, QueryResult};
use crate::filter::{filter_by, Selection};
use crate::format::{correlation_strength, fixed, Quantity, Unit, NOT_AVAILABLE};
use crate::schema::{CategoricalColumn, NumericColumn};
use serde::Serialize;

/// Shown when the crop selector is on the "All" sentinel.
pub const SELECT_CROP_PLACEHOLDER: &str = "Please select a specific crop for detailed insights.";

/// Knobs for report content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightOptions {
    /// Entries in each "top" list of the key findings.
    pub top_n: usize,
    /// Decimals for crop report metrics.
    pub decimals: usize,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            top_n: 3,
            decimals: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    /// A labelled value.
    Metric { label: String, value: String },
    /// A labelled, ordered list such as "Rice (150 units), Ragi (90 units)".
    Ranking { label: String, entries: Vec<String> },
    /// Label → count table.
    Tally { rows: Vec<(String, usize)> },
    Note { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightReport {
    pub title: String,
    pub sections: Vec<Section>,
}

/// Chained builder: items are appended to the most recently opened section.
pub struct ReportBuilder {
    report: InsightReport,
}

impl ReportBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            report: InsightReport {
                title: title.into(),
                sections: Vec::new(),
            },
        }
    }

    pub fn section(mut self, heading: impl Into<String>) -> Self {
        self.report.sections.push(Section {
            heading: heading.into(),
            items: Vec::new(),
        });
        self
    }

    fn push(mut self, item: Item) -> Self {
        if self.report.sections.is_empty() {
            self = self.section("");
        }
        if let Some(section) = self.report.sections.last_mut() {
            section.items.push(item);
        }
        self
    }

    pub fn metric(self, label: impl Into<String>, value: impl ToString) -> Self {
        self.push(Item::Metric {
            label: label.into(),
            value: value.to_string(),
        })
    }

    pub fn ranking(self, label: impl Into<String>, entries: Vec<String>) -> Self {
        self.push(Item::Ranking {
            label: label.into(),
            entries,
        })
    }

    pub fn tally(self, rows: Vec<(String, usize)>) -> Self {
        self.push(Item::Tally { rows })
    }

    pub fn note(self, text: impl Into<String>) -> Self {
        self.push(Item::Note { text: text.into() })
    }

    pub fn build(self) -> InsightReport {
        self.report
    }
}

impl InsightReport {
    pub fn builder(title: impl Into<String>) -> ReportBuilder {
        ReportBuilder::new(title)
    }

    /// Numbered sections with indented bullet metrics.
    pub fn render_text(&self) -> String {
        let mut out = format!("{}:\n", self.title);
        for (i, section) in self.sections.iter().enumerate() {
            out.push_str(&format!("\n{}. {}:\n", i + 1, section.heading));
            for item in &section.items {
                match item {
                    Item::Metric { label, value } => {
                        out.push_str(&format!("   - {label}: {value}\n"));
                    }
                    Item::Ranking { label, entries } => {
                        out.push_str(&format!("   - {label}: {}\n", join_entries(entries)));
                    }
                    Item::Tally { rows } => out.push_str(&render_tally(rows, "   ")),
                    Item::Note { text } => out.push_str(&format!("   {text}\n")),
                }
            }
        }
        out
    }

    /// `##` title, `###` sections, numbered bold rankings and bold-label bullets.
    pub fn render_markdown(&self) -> String {
        let mut out = format!("## {}\n", self.title);
        for section in &self.sections {
            out.push_str(&format!("\n### {}\n\n", section.heading));
            let mut ranking_no = 0;
            let mut previous_was_ranking = false;
            for item in &section.items {
                match item {
                    Item::Ranking { label, entries } => {
                        if previous_was_ranking {
                            out.push('\n');
                        }
                        ranking_no += 1;
                        out.push_str(&format!(
                            "{ranking_no}. **{label}:**\n   {}\n",
                            join_entries(entries)
                        ));
                        previous_was_ranking = true;
                        continue;
                    }
                    Item::Metric { label, value } => {
                        out.push_str(&format!("- **{label}:** {value}\n"));
                    }
                    Item::Tally { rows } => out.push_str(&render_tally(rows, "    ")),
                    Item::Note { text } => out.push_str(&format!("- {text}\n")),
                }
                previous_was_ranking = false;
            }
        }
        out
    }
}

fn join_entries(entries: &[String]) -> String {
    if entries.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        entries.join(", ")
    }
}

fn render_tally(rows: &[(String, usize)], indent: &str) -> String {
    if rows.is_empty() {
        return format!("{indent}{NOT_AVAILABLE}\n");
    }
    let width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    rows.iter()
        .map(|(k, n)| format!("{indent}{k:<width$}  {n}\n"))
        .collect()
}

/// Per-crop insight text: a report, or a placeholder when no single crop applies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CropInsight {
    Report(InsightReport),
    Placeholder(String),
}

impl CropInsight {
    pub fn render_text(&self) -> String {
        match self {
            Self::Report(r) => r.render_text(),
            Self::Placeholder(p) => p.clone(),
        }
    }
}

/// Detailed report over the records of one crop.
pub fn crop_report(
    dataset: &Dataset,
    crop: &Selection,
    options: &InsightOptions,
) -> QueryResult<CropInsight> {
    let crop = match crop {
        Selection::All => return Ok(CropInsight::Placeholder(SELECT_CROP_PLACEHOLDER.into())),
        Selection::Value(c) => c,
    };
    let subset = filter_by(dataset, CategoricalColumn::Crop, &Selection::Value(crop.clone()))?;
    if subset.is_empty() {
        return Ok(CropInsight::Placeholder(format!(
            "No records found for crop '{crop}'."
        )));
    }

    let d = options.decimals;
    let yields = summarize(&subset, NumericColumn::Yield)?;
    let temperature = summarize(&subset, NumericColumn::Temperature)?;
    let rainfall = summarize(&subset, NumericColumn::Rainfall)?;
    let humidity = summarize(&subset, NumericColumn::Humidity)?;
    let price = summarize(&subset, NumericColumn::Price)?;

    let report = InsightReport::builder(format!("Detailed Analysis for {crop}"))
        .section("Production Metrics")
        .metric(
            "Average Yield",
            Quantity::new(yields.mean, Unit::UnitsPerArea, d),
        )
        .metric("Maximum Yield", Quantity::plain(yields.max, d))
        .metric("Minimum Yield", Quantity::plain(yields.min, d))
        .section("Growing Conditions")
        .metric(
            "Average Temperature",
            Quantity::new(temperature.mean, Unit::Celsius, d),
        )
        .metric(
            "Average Rainfall",
            Quantity::new(rainfall.mean, Unit::Millimetres, d),
        )
        .metric(
            "Average Humidity",
            Quantity::new(humidity.mean, Unit::Percent, d),
        )
        .section("Economic Metrics")
        .metric("Average Price", Quantity::new(price.mean, Unit::Rupees, d))
        .metric(
            "Price Range",
            format!(
                "{} - {}",
                Quantity::new(price.min, Unit::Rupees, d),
                Quantity::new(price.max, Unit::Rupees, d)
            ),
        )
        .section("Seasonal Distribution")
        .tally(value_counts(&subset, CategoricalColumn::Season)?)
        .section("Preferred Soil Types")
        .tally(value_counts(&subset, CategoricalColumn::SoilType)?)
        .build();

    tracing::debug!(crop = %crop, rows = subset.height(), "built crop report");
    Ok(CropInsight::Report(report))
}

/// Top-N crops by mean of `value`, formatted as "Crop (value)" in the column's unit.
fn top_crops_by_mean(
    dataset: &Dataset,
    value: NumericColumn,
    n: usize,
) -> QueryResult<Vec<String>> {
    let unit = Unit::of(value);
    let result = aggregate_by(
        dataset,
        CategoricalColumn::Crop,
        value,
        StatSet::of(&[Statistic::Mean]),
    )?;
    Ok(rank(&result, Statistic::Mean, n, Order::Descending)?
        .into_iter()
        .map(|(crop, v)| format!("{crop} ({})", Quantity::new(v, unit, 0)))
        .collect())
}

/// Dataset-wide findings: leaders by yield, price and record count, best season, environment
/// ranges and correlation-based trends.
pub fn key_findings(dataset: &Dataset, options: &InsightOptions) -> QueryResult<InsightReport> {
    let n = options.top_n;

    let top_yield = top_crops_by_mean(dataset, NumericColumn::Yield, n)?;
    let top_price = top_crops_by_mean(dataset, NumericColumn::Price, n)?;

    let counts = aggregate_by(
        dataset,
        CategoricalColumn::Crop,
        NumericColumn::Yield,
        StatSet::of(&[Statistic::Count]),
    )?;
    let most_common: Vec<String> = rank(&counts, Statistic::Count, n, Order::Descending)?
        .into_iter()
        .map(|(crop, c)| format!("{crop} ({})", Quantity::new(c, Unit::Records, 0)))
        .collect();

    let season_yield = aggregate_by(
        dataset,
        CategoricalColumn::Season,
        NumericColumn::Yield,
        StatSet::of(&[Statistic::Mean]),
    )?;
    let best_season = match best_group(&season_yield, Statistic::Mean, Order::Descending) {
        Ok(season) => season,
        Err(QueryError::EmptyResult) => NOT_AVAILABLE.to_string(),
        Err(e) => return Err(e),
    };

    let temperature = summarize(dataset, NumericColumn::Temperature)?;
    let rainfall = summarize(dataset, NumericColumn::Rainfall)?;
    let humidity = summarize(dataset, NumericColumn::Humidity)?;

    let temp_r = correlation(dataset, NumericColumn::Temperature, NumericColumn::Yield)?;
    let rain_r = correlation(dataset, NumericColumn::Rainfall, NumericColumn::Yield)?;

    let season_price = aggregate_by(
        dataset,
        CategoricalColumn::Season,
        NumericColumn::Price,
        StatSet::of(&[Statistic::Mean]),
    )?;
    let cheapest = rank(&season_price, Statistic::Mean, 1, Order::Ascending)?;
    let dearest = rank(&season_price, Statistic::Mean, 1, Order::Descending)?;
    let price_spread = match (cheapest.first(), dearest.first()) {
        (Some((low_season, low)), Some((high_season, high))) => format!(
            "Mean price across seasons ranges from {} ({low_season}) to {} ({high_season})",
            Quantity::new(*low, Unit::Rupees, 0),
            Quantity::new(*high, Unit::Rupees, 0)
        ),
        _ => format!("Mean price across seasons: {NOT_AVAILABLE}"),
    };

    let report = InsightReport::builder("Key Findings from the Analysis")
        .section("Top Performers")
        .ranking("Highest Yielding Crops", top_yield)
        .ranking("Most Valuable Crops", top_price)
        .ranking("Most Commonly Grown Crops", most_common)
        .section("Environmental Insights")
        .metric("Best Performing Season", best_season)
        .metric(
            "Temperature Range",
            format!(
                "{} to {}",
                Quantity::new(temperature.min, Unit::Celsius, 1),
                Quantity::new(temperature.max, Unit::Celsius, 1)
            ),
        )
        .metric(
            "Average Rainfall",
            Quantity::new(rainfall.mean, Unit::Millimetres, 1),
        )
        .metric(
            "Humidity Levels",
            format!(
                "{} to {}",
                Quantity::new(humidity.min, Unit::Percent, 1),
                Quantity::new(humidity.max, Unit::Percent, 1)
            ),
        )
        .section("Notable Trends")
        .note(format!(
            "Temperature and yield: {} correlation (r = {})",
            correlation_strength(temp_r),
            fixed(temp_r, 2)
        ))
        .note(format!(
            "Rainfall and yield: {} correlation (r = {})",
            correlation_strength(rain_r),
            fixed(rain_r, 2)
        ))
        .note(price_spread)
        .build();

    tracing::debug!(rows = dataset.height(), "built key findings");
    Ok(report)
}

/// Plain-text crop report for `crop_key` ("All" / "All Crops" yield the placeholder).
pub fn format_crop_report(dataset: &Dataset, crop_key: &str) -> QueryResult<String> {
    Ok(crop_report(dataset, &Selection::parse(crop_key), &InsightOptions::default())?.render_text())
}

/// Markdown key findings with the default top-3 lists.
pub fn format_key_findings(dataset: &Dataset) -> QueryResult<String> {
    Ok(key_findings(dataset, &InsightOptions::default())?.render_markdown())
}
