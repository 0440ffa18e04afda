//! Chart export to PNG using the plotters bitmap backend.

use color_eyre::Result;
use std::path::Path;

use crate::chart_data::{BarData, ScatterData};

/// Output size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 640,
        }
    }
}

const PALETTE: [(u8, u8, u8); 7] = [
    (0, 179, 230),   // cyan
    (230, 0, 128),   // magenta
    (0, 179, 0),     // green
    (230, 204, 0),   // yellow
    (0, 0, 230),     // blue
    (230, 0, 0),     // red
    (128, 230, 230), // light cyan
];

/// Pad a degenerate or tight range so points do not sit on the frame.
fn padded(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span <= 0.0 || !span.is_finite() {
        let pad = if min.abs() > 0.0 { min.abs() * 0.1 } else { 1.0 };
        (min - pad, max + pad)
    } else {
        (min - span * 0.05, max + span * 0.05)
    }
}

/// Marker radius from rainfall, scaled into 3..=12 px over the plotted range.
fn marker_radius(size: f64, min: f64, max: f64) -> i32 {
    if !size.is_finite() || max <= min {
        return 5;
    }
    let t = ((size - min) / (max - min)).clamp(0.0, 1.0);
    (3.0 + t * 9.0).round() as i32
}

/// Write the yield scatter: one color per season, marker size by rainfall.
pub fn write_scatter_png(path: &Path, data: &ScatterData, size: ChartSize) -> Result<()> {
    use plotters::prelude::*;

    let bounds = data
        .bounds()
        .ok_or_else(|| color_eyre::eyre::eyre!("No data to export"))?;

    let (size_min, size_max) = data
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.size))
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let root = BitMapBackend::new(path, (size.width, size.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_min, x_max) = padded(bounds.x_min, bounds.x_max);
    let (y_min, y_max) = padded(bounds.y_min, bounds.y_max);

    let mut chart = ChartBuilder::on(&root)
        .caption(data.title.as_str(), ("sans-serif", 22))
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(data.x_label.as_str())
        .y_desc(data.y_label.as_str())
        .draw()?;

    for (idx, s) in data.series.iter().enumerate() {
        if s.points.is_empty() {
            continue;
        }
        let (r, g, b) = PALETTE[idx % PALETTE.len()];
        let color = RGBColor(r, g, b);
        chart
            .draw_series(s.points.iter().map(|p| {
                Circle::new(
                    (p.x, p.y),
                    marker_radius(p.size, size_min, size_max),
                    color.mix(0.7).filled(),
                )
            }))?
            .label(s.name.as_str())
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    tracing::info!(path = %path.display(), points = data.point_count(), "exported scatter chart");
    Ok(())
}

/// Write a bar chart with one bar per key, labelled on the x axis.
pub fn write_bar_png(path: &Path, data: &BarData, size: ChartSize) -> Result<()> {
    use plotters::prelude::*;

    if data.is_empty() {
        return Err(color_eyre::eyre::eyre!("No data to export"));
    }

    let root = BitMapBackend::new(path, (size.width, size.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = data.bars.len();
    let y_max = data.max_value().max(f64::EPSILON) * 1.1;
    let labels: Vec<String> = data.bars.iter().map(|(k, _)| k.clone()).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(data.title.as_str(), ("sans-serif", 22))
        .margin(30)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5_f64..(n as f64 - 0.5), 0.0_f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| {
            let i = x.round();
            if (x - i).abs() < 1e-6 && i >= 0.0 {
                labels.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .x_desc(data.x_label.as_str())
        .y_desc(data.y_label.as_str())
        .draw()?;

    let (r, g, b) = PALETTE[0];
    let color = RGBColor(r, g, b);
    chart.draw_series(
        data.bars
            .iter()
            .enumerate()
            .filter(|(_, (_, v))| v.is_finite())
            .map(|(i, (_, v))| {
                let x = i as f64;
                Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *v)], color.filled())
            }),
    )?;

    root.present()?;
    tracing::info!(path = %path.display(), bars = n, "exported bar chart");
    Ok(())
}
