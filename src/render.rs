//! Drawing the dashboard with ratatui.

use crate::aggregate::StatsRow;
use crate::app::{App, Selector, Tab};
use crate::chart_data::{BarData, ScatterData, ScatterPoint};
use crate::format::fixed;
use crate::widgets::controls::Controls;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset as ChartSeries, GraphType,
    List, ListItem, ListState, Paragraph, Row, StatefulWidget, Table, Tabs, Widget, Wrap,
};

const ABOUT: &str = "Explore how temperature, rainfall, humidity and soil type relate to crop \
yields and prices across growing seasons.";

/// Background shown above the key findings, in the same markdown subset.
const DATA_GUIDE: &str = "### Understanding the Data
Growing seasons:
- **Kharif (Monsoon):** June-October
- **Rabi (Winter):** November-April
- **Zaid (Summer):** March-June
Key metrics:
- **Yield:** crop production per unit area
- **Temperature:** degrees Celsius (°C)
- **Rainfall:** millimetres (mm)
- **Humidity:** percentage of moisture in the air
- **Price:** Indian Rupees (₹)
";

const CROP_GUIDE: &str = "Select a crop, compare its yield against temperature per season, then \
review the detailed insights below.";
const SEASON_GUIDE: &str = "Select a season to compare average yield across crops and find the \
best growing period.";
const PRICE_GUIDE: &str = "Mean is the average price of a crop. Min and Max give its price range \
and Std its variability.";

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Red,
];

const SELECTOR_WIDTH: u16 = 24;

/// Most points the terminal scatter draws. Print mode and PNG export get every point.
const TERMINAL_POINT_LIMIT: usize = 5_000;

fn hints(tab: Tab) -> &'static [(&'static str, &'static str)] {
    match tab {
        Tab::Overview => &[("Tab", "Next"), ("↑↓", "Scroll"), ("q", "Quit")],
        Tab::CropAnalysis => &[("Tab", "Next"), ("↑↓", "Crop"), ("q", "Quit")],
        Tab::SeasonalPatterns => &[("Tab", "Next"), ("↑↓", "Season"), ("q", "Quit")],
        Tab::PriceAnalysis => &[("Tab", "Next"), ("p", "Price Trends"), ("q", "Quit")],
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(3),
                Constraint::Fill(1),
                Constraint::Length(1),
            ],
        )
        .split(area);

        Tabs::new(
            Tab::ALL
                .iter()
                .enumerate()
                .map(|(i, t)| format!("{} {}", i + 1, t.title())),
        )
        .block(Block::default().borders(Borders::ALL).title(" cropscope "))
        .select(self.tab.index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .render(layout[0], buf);

        match self.tab {
            Tab::Overview => render_overview(self, layout[1], buf),
            Tab::CropAnalysis => render_crop_analysis(self, layout[1], buf),
            Tab::SeasonalPatterns => render_seasonal(self, layout[1], buf),
            Tab::PriceAnalysis => render_prices(self, layout[1], buf),
        }

        let records = format!("{} records", self.dataset().height());
        let controls = match &self.status {
            Some(msg) => Controls::new(hints(self.tab)).with_status(msg, true),
            None => Controls::new(hints(self.tab)).with_status(&records, false),
        };
        (&controls).render(layout[2], buf);
    }
}

fn render_overview(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines: Vec<Line> = vec![
        Line::from("Agricultural Data Analysis Dashboard".bold()),
        Line::from(ABOUT),
        Line::from(""),
    ];
    lines.extend(DATA_GUIDE.lines().map(markdown_line));
    lines.push(Line::from(""));
    lines.extend(app.overview.lines().map(markdown_line));
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Overview "))
        .wrap(Wrap { trim: false })
        .scroll((app.overview_scroll, 0))
        .render(area, buf);
}

/// Headings bold, `**` markers stripped.
fn markdown_line(line: &str) -> Line<'static> {
    let text = line.replace("**", "");
    if let Some(h) = text.strip_prefix("### ") {
        Line::from(h.to_string().bold().cyan())
    } else if let Some(h) = text.strip_prefix("## ") {
        Line::from(h.to_string().bold())
    } else {
        Line::from(text)
    }
}

/// One dimmed guide line at the top of `area`; returns the space below it.
fn render_guide(text: &str, area: Rect, buf: &mut Buffer) -> Rect {
    let rows = Layout::new(
        Direction::Vertical,
        [Constraint::Length(1), Constraint::Fill(1)],
    )
    .split(area);
    Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .render(rows[0], buf);
    rows[1]
}

fn split_selector(area: Rect) -> (Rect, Rect) {
    let cols = Layout::new(
        Direction::Horizontal,
        [Constraint::Length(SELECTOR_WIDTH), Constraint::Fill(1)],
    )
    .split(area);
    (cols[0], cols[1])
}

fn render_selector(selector: &Selector, title: &str, area: Rect, buf: &mut Buffer) {
    let items: Vec<ListItem> = selector
        .choices
        .iter()
        .map(|c| ListItem::new(c.as_str()))
        .collect();
    let mut state = ListState::default().with_selected(Some(selector.index));
    StatefulWidget::render(
        List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> "),
        area,
        buf,
        &mut state,
    );
}

fn render_crop_analysis(app: &App, area: Rect, buf: &mut Buffer) {
    let area = render_guide(CROP_GUIDE, area, buf);
    let (left, right) = split_selector(area);
    render_selector(&app.crops, " Crop ", left, buf);

    let rows = Layout::new(
        Direction::Vertical,
        [Constraint::Percentage(60), Constraint::Percentage(40)],
    )
    .split(right);

    match &app.crop_view {
        Some(view) => {
            render_scatter(&view.scatter, rows[0], buf);
            Paragraph::new(view.insight.as_str())
                .block(Block::default().borders(Borders::ALL).title(" Insights "))
                .wrap(Wrap { trim: false })
                .render(rows[1], buf);
        }
        None => empty_block(" Yield Analysis ", right, buf),
    }
}

fn render_scatter(data: &ScatterData, area: Rect, buf: &mut Buffer) {
    let title = format!(" {} ", data.title);
    let Some(bounds) = data.bounds() else {
        empty_block(&title, area, buf);
        return;
    };
    let total = data.point_count();
    let points: Vec<Vec<(f64, f64)>> = data
        .series
        .iter()
        .map(|s| thinned(&s.points, total, TERMINAL_POINT_LIMIT))
        .collect();
    let datasets: Vec<ChartSeries> = data
        .series
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (s, pts))| {
            ChartSeries::default()
                .name(s.name.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(pts)
        })
        .collect();

    let (x_min, x_max) = widen(bounds.x_min, bounds.x_max);
    let (y_min, y_max) = widen(bounds.y_min, bounds.y_max);
    Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(
            Axis::default()
                .title(data.x_label.as_str())
                .bounds([x_min, x_max])
                .labels([fixed(x_min, 1), fixed((x_min + x_max) / 2.0, 1), fixed(x_max, 1)]),
        )
        .y_axis(
            Axis::default()
                .title(data.y_label.as_str())
                .bounds([y_min, y_max])
                .labels([fixed(y_min, 0), fixed((y_min + y_max) / 2.0, 0), fixed(y_max, 0)]),
        )
        .render(area, buf);
}

/// Every n-th point, with n chosen so that `total` points across all series fit in `limit`.
fn thinned(points: &[ScatterPoint], total: usize, limit: usize) -> Vec<(f64, f64)> {
    let step = total.div_ceil(limit.max(1)).max(1);
    points.iter().step_by(step).map(|p| (p.x, p.y)).collect()
}

/// Axis bounds must not be degenerate.
fn widen(min: f64, max: f64) -> (f64, f64) {
    if max > min {
        (min, max)
    } else {
        (min - 1.0, max + 1.0)
    }
}

fn render_seasonal(app: &App, area: Rect, buf: &mut Buffer) {
    let area = render_guide(SEASON_GUIDE, area, buf);
    let (left, right) = split_selector(area);
    render_selector(&app.seasons, " Season ", left, buf);
    match &app.season_view {
        Some(bars) => render_bars(bars, right, buf),
        None => empty_block(" Seasonal Patterns ", right, buf),
    }
}

fn render_bars(data: &BarData, area: Rect, buf: &mut Buffer) {
    let title = format!(" {} ", data.title);
    if data.is_empty() {
        empty_block(&title, area, buf);
        return;
    }
    let bars: Vec<Bar> = data
        .bars
        .iter()
        .map(|(key, v)| {
            Bar::default()
                .label(Line::from(key.as_str()))
                .value(if v.is_finite() { v.max(0.0).round() as u64 } else { 0 })
                .text_value(fixed(*v, 0))
        })
        .collect();
    let inner_width = area.width.saturating_sub(2);
    let n = data.bars.len() as u16;
    let bar_width = (inner_width / n.max(1)).saturating_sub(1).clamp(1, 12);
    BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .render(area, buf);
}

fn render_prices(app: &App, area: Rect, buf: &mut Buffer) {
    let area = render_guide(PRICE_GUIDE, area, buf);
    let rows = Layout::new(
        Direction::Vertical,
        [Constraint::Percentage(55), Constraint::Percentage(45)],
    )
    .split(area);

    match &app.price_trends {
        Some(trends) => render_bars(trends, rows[0], buf),
        None => Paragraph::new("Press Enter or p to show price trends.")
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Average Price by Crop "),
            )
            .render(rows[0], buf),
    }
    render_stats_table(&app.price_stats, rows[1], buf);
}

fn render_stats_table(stats: &[StatsRow], area: Rect, buf: &mut Buffer) {
    let header = Row::new(["Crop", "Mean", "Min", "Max", "Std"].map(Cell::from))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = stats.iter().map(|r| {
        Row::new([
            Cell::from(r.key.clone()),
            Cell::from(fixed(r.mean, 2)),
            Cell::from(fixed(r.min, 2)),
            Cell::from(fixed(r.max, 2)),
            Cell::from(fixed(r.std, 2)),
        ])
    });
    Widget::render(
        Table::new(
            rows,
            [
                Constraint::Fill(2),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(1),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Price Statistics by Crop (₹) "),
        ),
        area,
        buf,
    );
}

fn empty_block(title: &str, area: Rect, buf: &mut Buffer) {
    Paragraph::new("No data for the current selection.")
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .render(area, buf);
}
