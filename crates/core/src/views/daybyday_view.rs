use chrono::{DateTime, NaiveDate, Utc};

use super::load_state::{LoadState, Tracked, ViewMarker};
use crate::errors::CoreError;
use crate::models::chart::{ChartTab, ChartTable, Horizon};
use crate::models::daybyday::{DayByDay, ProjectionSeries, ProjectionWindow};
use crate::services::chart_service::ChartService;

pub const DAYBYDAY_LOADING_MESSAGE: &str = "Loading...";
pub const DAYBYDAY_ERROR_MESSAGE: &str =
    "Error occurred while fetching the future! Try refreshing the page.";
pub const DAYBYDAY_EMPTY_MESSAGE: &str =
    "Looks like there are no transactions in the time frame selected...";
pub const SPECULATIVE_HORIZON_NOTE: &str = "May not be as accurate, use with caution";

/// Headline figures shown above the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionSummary {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Day with the lowest expected balance (the first such day on ties)
    pub lowest_balance_date: NaiveDate,
    pub lowest_balance: f64,
}

/// The projection panel: window selection, load state and chart tab.
pub struct DayByDayView {
    origin: DateTime<Utc>,
    horizon: Horizon,
    tab: ChartTab,
    series: Tracked<ProjectionSeries>,
    chart_service: ChartService,
}

impl DayByDayView {
    pub fn new(origin: DateTime<Utc>, horizon: Horizon) -> Self {
        Self {
            origin,
            horizon,
            tab: ChartTab::default(),
            series: Tracked::new(),
            chart_service: ChartService::new(),
        }
    }

    pub fn origin(&self) -> DateTime<Utc> {
        self.origin
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn tab(&self) -> ChartTab {
        self.tab
    }

    /// `[origin, origin + horizon]`, the range the next request asks for.
    pub fn window(&self) -> ProjectionWindow {
        ProjectionWindow::new(self.origin, self.horizon.days())
    }

    pub fn set_origin(&mut self, origin: DateTime<Utc>) {
        self.origin = origin;
    }

    /// Returns `true` if the horizon changed (and the projection must be re-read).
    pub fn select_horizon(&mut self, horizon: Horizon) -> bool {
        let changed = self.horizon != horizon;
        self.horizon = horizon;
        changed
    }

    /// Switching tabs only re-shapes data already loaded.
    pub fn select_tab(&mut self, tab: ChartTab) {
        self.tab = tab;
    }

    pub fn state(&self) -> &LoadState<ProjectionSeries> {
        self.series.state()
    }

    pub fn marker(&self) -> ViewMarker {
        match self.series.state() {
            LoadState::Loading => ViewMarker::DayByDayLoading,
            LoadState::Error(_) => ViewMarker::DayByDayError,
            LoadState::Empty => ViewMarker::DayByDayEmpty,
            LoadState::Loaded(_) => ViewMarker::DayByDayChart,
        }
    }

    /// Start a fetch for the current window. Returns the generation and the
    /// window the request must use.
    pub fn begin_load(&mut self) -> (u64, ProjectionWindow) {
        (self.series.begin(), self.window())
    }

    /// Apply a fetch result for `window`. Out-of-order or duplicated days
    /// turn into the error state.
    pub fn finish_load(
        &mut self,
        generation: u64,
        window: &ProjectionWindow,
        result: Result<Vec<DayByDay>, CoreError>,
    ) -> bool {
        let series = result.and_then(|points| ProjectionSeries::from_points(points, window));
        self.series.finish(
            generation,
            series,
            ProjectionSeries::is_empty,
            DAYBYDAY_ERROR_MESSAGE,
        )
    }

    /// The chart for the selected tab; `None` unless a non-empty series is loaded.
    pub fn chart(&self) -> Option<ChartTable> {
        self.series
            .state()
            .loaded()
            .and_then(|series| self.chart_service.build(self.tab, series))
    }

    /// `None` unless a non-empty series is loaded.
    pub fn summary(&self) -> Option<ProjectionSummary> {
        let series = self.series.state().loaded()?;
        let (lowest_balance_date, lowest_balance) = series.lowest_balance()?;
        Some(ProjectionSummary {
            first_date: series.first_date()?,
            last_date: series.last_date()?,
            lowest_balance_date,
            lowest_balance,
        })
    }

    /// The text a renderer shows instead of a chart, if any.
    pub fn status_message(&self) -> Option<&str> {
        match self.series.state() {
            LoadState::Loading => Some(DAYBYDAY_LOADING_MESSAGE),
            LoadState::Error(message) => Some(message.as_str()),
            LoadState::Empty => Some(DAYBYDAY_EMPTY_MESSAGE),
            LoadState::Loaded(_) => None,
        }
    }
}
