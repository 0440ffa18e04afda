//! Dashboard state and input handling.
//!
//! The four tabs each own the last output computed for their selection. Outputs are rebuilt
//! when a selection changes; redraws only read them.

use crate::aggregate::StatsRow;
use crate::chart_data::{price_statistics, price_trends, seasonal_pattern, yield_scatter, BarData, ScatterData};
use crate::dataset::Dataset;
use crate::error::QueryResult;
use crate::error_display::user_message_from_query;
use crate::filter::{Selection, ALL_CROPS};
use crate::insight::{crop_report, key_findings, InsightOptions};
use crate::schema::CategoricalColumn;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Overview,
    CropAnalysis,
    SeasonalPatterns,
    PriceAnalysis,
}

impl Tab {
    pub const ALL: [Self; 4] = [
        Self::Overview,
        Self::CropAnalysis,
        Self::SeasonalPatterns,
        Self::PriceAnalysis,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::CropAnalysis => "Crop Analysis",
            Self::SeasonalPatterns => "Seasonal Patterns",
            Self::PriceAnalysis => "Price Analysis",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub enum AppEvent {
    Key(KeyEvent),
    SelectCrop(Selection),
    SelectSeason(String),
    ShowPriceTrends,
    Exit,
    Resize(u16, u16), // resized (width, height)
}

/// A list selector with a highlighted entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub choices: Vec<String>,
    pub index: usize,
}

impl Selector {
    pub fn new(choices: Vec<String>) -> Self {
        Self { choices, index: 0 }
    }

    pub fn selected(&self) -> Option<&str> {
        self.choices.get(self.index).map(String::as_str)
    }

    /// Move by `delta`, clamped to the list. Returns whether the selection changed.
    pub fn step(&mut self, delta: isize) -> bool {
        if self.choices.is_empty() {
            return false;
        }
        let last = self.choices.len() - 1;
        let next = self.index.saturating_add_signed(delta).min(last);
        let changed = next != self.index;
        self.index = next;
        changed
    }
}

/// Crop Analysis output: scatter plus the crop report (or its placeholder).
#[derive(Debug, Clone, PartialEq)]
pub struct CropView {
    pub scatter: ScatterData,
    pub insight: String,
}

pub struct App {
    dataset: Dataset,
    options: InsightOptions,
    pub tab: Tab,
    pub overview: String,
    pub overview_scroll: u16,
    /// "All Crops" first, then every crop ascending.
    pub crops: Selector,
    pub crop_view: Option<CropView>,
    /// Distinct seasons ascending; there is no "All" entry.
    pub seasons: Selector,
    pub season_view: Option<BarData>,
    /// Stays `None` until price trends are requested.
    pub price_trends: Option<BarData>,
    pub price_stats: Vec<StatsRow>,
    /// Last error, shown in the status line until the next successful update.
    pub status: Option<String>,
}

impl App {
    pub fn new(dataset: Dataset, options: InsightOptions) -> Self {
        let mut app = Self {
            dataset,
            options,
            tab: Tab::default(),
            overview: String::new(),
            overview_scroll: 0,
            crops: Selector::default(),
            crop_view: None,
            seasons: Selector::default(),
            season_view: None,
            price_trends: None,
            price_stats: Vec::new(),
            status: None,
        };
        app.initialize();
        app
    }

    fn initialize(&mut self) {
        let mut crops = vec![ALL_CROPS.to_string()];
        match self.dataset.distinct(CategoricalColumn::Crop) {
            Ok(c) => crops.extend(c),
            Err(e) => self.report(&e),
        }
        self.crops = Selector::new(crops);
        match self.dataset.distinct(CategoricalColumn::Season) {
            Ok(s) => self.seasons = Selector::new(s),
            Err(e) => self.report(&e),
        }

        let overview = key_findings(&self.dataset, &self.options).map(|r| r.render_markdown());
        self.overview = self.ok_or_report(overview).unwrap_or_default();
        let stats = price_statistics(&self.dataset);
        self.price_stats = self.ok_or_report(stats).unwrap_or_default();

        self.update_crop_view(&Selection::All);
        if let Some(season) = self.seasons.selected().map(str::to_string) {
            self.update_season_view(&season);
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn report(&mut self, err: &crate::error::QueryError) {
        tracing::warn!(error = %err, "dashboard update failed");
        self.status = Some(user_message_from_query(err));
    }

    fn ok_or_report<T>(&mut self, result: QueryResult<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    fn update_crop_view(&mut self, crop: &Selection) {
        let view = yield_scatter(&self.dataset, crop).and_then(|scatter| {
            let insight = crop_report(&self.dataset, crop, &self.options)?.render_text();
            Ok(CropView { scatter, insight })
        });
        if let Some(view) = self.ok_or_report(view) {
            self.crop_view = Some(view);
            self.status = None;
        }
    }

    fn update_season_view(&mut self, season: &str) {
        let bars = seasonal_pattern(&self.dataset, season);
        if let Some(bars) = self.ok_or_report(bars) {
            self.season_view = Some(bars);
            self.status = None;
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::SelectCrop(crop) => {
                tracing::debug!(crop = crop.label(ALL_CROPS), "crop selected");
                self.update_crop_view(crop);
                None
            }
            AppEvent::SelectSeason(season) => {
                tracing::debug!(season = season.as_str(), "season selected");
                self.update_season_view(season);
                None
            }
            AppEvent::ShowPriceTrends => {
                let trends = price_trends(&self.dataset);
                if let Some(trends) = self.ok_or_report(trends) {
                    self.price_trends = Some(trends);
                    self.status = None;
                }
                None
            }
            AppEvent::Exit | AppEvent::Resize(_, _) => None,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(AppEvent::Exit)
            }
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppEvent::Exit),
            KeyCode::Tab => {
                self.tab = self.tab.next();
                return None;
            }
            KeyCode::BackTab => {
                self.tab = self.tab.previous();
                return None;
            }
            KeyCode::Char(c @ '1'..='4') => {
                self.tab = Tab::ALL[c as usize - '1' as usize];
                return None;
            }
            _ => {}
        }

        let delta = match event.code {
            KeyCode::Up | KeyCode::Char('k') => -1,
            KeyCode::Down | KeyCode::Char('j') => 1,
            KeyCode::PageUp => -10,
            KeyCode::PageDown => 10,
            KeyCode::Enter | KeyCode::Char('p') if self.tab == Tab::PriceAnalysis => {
                return Some(AppEvent::ShowPriceTrends)
            }
            _ => return None,
        };

        match self.tab {
            Tab::Overview => {
                self.overview_scroll = self.overview_scroll.saturating_add_signed(delta as i16);
                None
            }
            Tab::CropAnalysis => self
                .crops
                .step(delta)
                .then(|| self.crops.selected().map(|c| AppEvent::SelectCrop(Selection::parse(c))))
                .flatten(),
            Tab::SeasonalPatterns => self
                .seasons
                .step(delta)
                .then(|| self.seasons.selected().map(|s| AppEvent::SelectSeason(s.to_string())))
                .flatten(),
            Tab::PriceAnalysis => None,
        }
    }
}
