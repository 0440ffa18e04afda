//! Crop yield, season and price exploration.
//!
//! The core is a read-only [`DatasetStore`] plus three pure engines over it: [`filter`],
//! [`aggregate`] and [`insight`]. The terminal dashboard ([`App`]) and print mode
//! ([`print::print_view`]) are thin layers on top.

use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::Duration;

pub mod aggregate;
pub mod app;
pub mod cache;
pub mod chart_data;
pub mod chart_export;
pub mod config;
pub mod dataset;
pub mod error;
pub mod error_display;
pub mod filter;
pub mod format;
pub mod insight;
pub mod logging;
pub mod print;
mod render;
pub mod schema;
pub mod widgets;

pub use aggregate::{aggregate, rank, AggregationResult, Order, StatSet, Statistic};
pub use app::{App, AppEvent, Tab};
pub use cache::CacheManager;
pub use config::{AppConfig, ConfigManager};
pub use dataset::{Dataset, DatasetStore, LoadOptions};
pub use error::{LoadError, QueryError, QueryResult};
pub use filter::{filter, Selection};
pub use insight::{format_crop_report, format_key_findings, InsightOptions};
pub use schema::{CategoricalColumn, Column, NumericColumn, Record};

/// Application name used for config and cache directories
pub const APP_NAME: &str = "cropscope";

/// Dataset file used when neither the command line nor the config names one
pub const DEFAULT_DATA_FILE: &str = "data_season.csv";

fn render(terminal: &mut DefaultTerminal, app: &App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

/// Run the dashboard until the user quits.
pub fn run(mut terminal: DefaultTerminal, mut app: App, poll_interval: Duration) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    render(&mut terminal, &app)?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key)
                    if key.kind == crossterm::event::KeyEventKind::Press =>
                {
                    tx.send(AppEvent::Key(key))?
                }
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &app)?;
        }
    }
    tracing::info!("dashboard closed");
    Ok(())
}
