//! Non-interactive output: one view written to stdout as text or JSON, optionally with its chart
//! exported to PNG.

use crate::aggregate::StatsRow;
use crate::chart_data::{price_statistics, price_trends, seasonal_pattern, yield_scatter, BarData, ScatterData};
use crate::chart_export::{write_bar_png, write_scatter_png, ChartSize};
use crate::dataset::Dataset;
use crate::filter::{Selection, ALL_CROPS};
use crate::format::fixed;
use crate::insight::{crop_report, key_findings, CropInsight, InsightOptions, InsightReport};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use cropscope_cli::PrintView;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// What to print and how.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintOptions {
    pub view: PrintView,
    pub crop: Option<String>,
    pub season: Option<String>,
    pub json: bool,
    pub export_chart: Option<PathBuf>,
    pub insights: InsightOptions,
    pub chart_size: ChartSize,
}

impl PrintOptions {
    pub fn new(view: PrintView) -> Self {
        Self {
            view,
            crop: None,
            season: None,
            json: false,
            export_chart: None,
            insights: InsightOptions::default(),
            chart_size: ChartSize::default(),
        }
    }
}

#[derive(Serialize)]
struct CropOutput<'a> {
    crop: &'a str,
    scatter: &'a ScatterData,
    insight: &'a CropInsight,
}

#[derive(Serialize)]
struct PriceOutput<'a> {
    trends: &'a BarData,
    statistics: &'a [StatsRow],
}

/// A computed view, before rendering.
enum ViewOutput {
    Overview(InsightReport),
    Crop {
        crop: String,
        scatter: ScatterData,
        insight: CropInsight,
    },
    Season(BarData),
    Prices {
        trends: BarData,
        statistics: Vec<StatsRow>,
    },
}

fn compute(dataset: &Dataset, opts: &PrintOptions) -> Result<ViewOutput> {
    Ok(match opts.view {
        PrintView::Overview => ViewOutput::Overview(key_findings(dataset, &opts.insights)?),
        PrintView::Crop => {
            let crop = opts.crop.clone().unwrap_or_else(|| ALL_CROPS.to_string());
            let selection = Selection::parse(&crop);
            ViewOutput::Crop {
                scatter: yield_scatter(dataset, &selection)?,
                insight: crop_report(dataset, &selection, &opts.insights)?,
                crop,
            }
        }
        PrintView::Season => {
            let season = opts
                .season
                .as_deref()
                .ok_or_else(|| eyre!("--season is required with --print season"))?;
            ViewOutput::Season(seasonal_pattern(dataset, season)?)
        }
        PrintView::Prices => ViewOutput::Prices {
            trends: price_trends(dataset)?,
            statistics: price_statistics(dataset)?,
        },
    })
}

/// Write `opts.view` to `out`, then export its chart if requested.
pub fn print_view<W: Write>(dataset: &Dataset, opts: &PrintOptions, out: &mut W) -> Result<()> {
    let output = compute(dataset, opts)?;
    tracing::info!(view = opts.view.as_str(), json = opts.json, "printing view");

    if opts.json {
        match &output {
            ViewOutput::Overview(report) => serde_json::to_writer_pretty(&mut *out, report)?,
            ViewOutput::Crop {
                crop,
                scatter,
                insight,
            } => serde_json::to_writer_pretty(
                &mut *out,
                &CropOutput {
                    crop,
                    scatter,
                    insight,
                },
            )?,
            ViewOutput::Season(bars) => serde_json::to_writer_pretty(&mut *out, bars)?,
            ViewOutput::Prices { trends, statistics } => serde_json::to_writer_pretty(
                &mut *out,
                &PriceOutput { trends, statistics },
            )?,
        }
        writeln!(out)?;
    } else {
        match &output {
            ViewOutput::Overview(report) => write!(out, "{}", report.render_markdown())?,
            ViewOutput::Crop {
                scatter, insight, ..
            } => {
                writeln!(out, "{} ({} points)", scatter.title, scatter.point_count())?;
                writeln!(out)?;
                writeln!(out, "{}", insight.render_text().trim_end())?;
            }
            ViewOutput::Season(bars) => write!(out, "{}", render_bars_text(bars))?,
            ViewOutput::Prices { trends, statistics } => {
                write!(out, "{}", render_bars_text(trends))?;
                writeln!(out)?;
                write!(out, "{}", render_stats_text(statistics))?;
            }
        }
    }

    if let Some(path) = &opts.export_chart {
        match &output {
            ViewOutput::Overview(_) => {
                return Err(eyre!("The overview has no chart to export"));
            }
            ViewOutput::Crop { scatter, .. } => write_scatter_png(path, scatter, opts.chart_size)?,
            ViewOutput::Season(bars) => write_bar_png(path, bars, opts.chart_size)?,
            ViewOutput::Prices { trends, .. } => write_bar_png(path, trends, opts.chart_size)?,
        }
    }
    Ok(())
}

/// Title line, then one aligned `label  value` row per bar.
pub fn render_bars_text(data: &BarData) -> String {
    let mut out = format!("{}\n", data.title);
    if data.bars.is_empty() {
        out.push_str("  (no records)\n");
        return out;
    }
    let width = data
        .bars
        .iter()
        .map(|(k, _)| k.chars().count())
        .max()
        .unwrap_or(0)
        .max(data.x_label.chars().count());
    out.push_str(&format!("  {:<width$}  {}\n", data.x_label, data.y_label));
    for (key, value) in &data.bars {
        out.push_str(&format!("  {:<width$}  {:>10}\n", key, fixed(*value, 2)));
    }
    out
}

pub fn render_stats_text(rows: &[StatsRow]) -> String {
    let width = rows
        .iter()
        .map(|r| r.key.chars().count())
        .max()
        .unwrap_or(0)
        .max("Crop".len());
    let mut out = format!(
        "{:<width$}  {:>10}  {:>10}  {:>10}  {:>10}\n",
        "Crop", "Mean", "Min", "Max", "Std"
    );
    for r in rows {
        out.push_str(&format!(
            "{:<width$}  {:>10}  {:>10}  {:>10}  {:>10}\n",
            r.key,
            fixed(r.mean, 2),
            fixed(r.min, 2),
            fixed(r.max, 2),
            fixed(r.std, 2)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Record;

    fn dataset() -> Dataset {
        let r = |crop: &str, season: &str, yield_: f64, price: f64| Record {
            crop: crop.into(),
            season: season.into(),
            soil_type: "alluvial".into(),
            temperature: 24.0,
            rainfall: 650.0,
            humidity: 70.0,
            yield_,
            price,
        };
        Dataset::from_records(&[
            r("Rice", "Kharif", 120.0, 1800.0),
            r("Ragi", "Kharif", 60.0, 2500.0),
            r("Rice", "Kharif", 100.0, 2000.0),
        ])
        .unwrap()
    }

    fn print(opts: &PrintOptions) -> Result<String> {
        let mut buf = Vec::new();
        print_view(&dataset(), opts, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn season_requires_season() {
        assert!(print(&PrintOptions::new(PrintView::Season)).is_err());
        let mut opts = PrintOptions::new(PrintView::Season);
        opts.season = Some("Kharif".into());
        let text = print(&opts).unwrap();
        assert!(text.starts_with("Average Yield by Crop in Kharif Season\n"));
        let rice = text.find("Rice").unwrap();
        let ragi = text.find("Ragi").unwrap();
        assert!(rice < ragi);
        assert!(text.contains("110.00"));
    }

    #[test]
    fn crop_defaults_to_all_crops_placeholder() {
        let text = print(&PrintOptions::new(PrintView::Crop)).unwrap();
        assert!(text.starts_with("Yield Analysis for All Crops (3 points)"));
        assert!(text.contains("Please select a specific crop for detailed insights."));
    }

    #[test]
    fn prices_json_has_trends_and_statistics() {
        let mut opts = PrintOptions::new(PrintView::Prices);
        opts.json = true;
        let value: serde_json::Value = serde_json::from_str(&print(&opts).unwrap()).unwrap();
        assert_eq!(value["trends"]["bars"][0][0], "Ragi");
        assert_eq!(value["statistics"][1]["key"], "Rice");
        assert_eq!(value["statistics"][1]["mean"], 1900.0);
    }

    #[test]
    fn overview_cannot_export_chart() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = PrintOptions::new(PrintView::Overview);
        opts.export_chart = Some(dir.path().join("overview.png"));
        assert!(print(&opts).is_err());
    }

    #[test]
    fn stats_text_alignment() {
        let text = render_stats_text(&[StatsRow {
            key: "Rice".into(),
            mean: 1900.0,
            min: 1800.0,
            max: 2000.0,
            std: f64::NAN,
        }]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Rice"));
        assert!(lines[1].trim_end().ends_with("n/a"));
    }
}
