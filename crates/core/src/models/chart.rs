use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

pub const BALANCE_COLOR: &str = "#4374E0";
pub const GREEN: &str = "#488214";
pub const RED: &str = "#dc3545";

/// How far ahead the projection looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Horizon {
    #[default]
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "20y")]
    TwentyYears,
    #[serde(rename = "30y")]
    ThirtyYears,
}

impl Horizon {
    pub const ALL: [Horizon; 7] = [
        Horizon::ThreeMonths,
        Horizon::OneYear,
        Horizon::TwoYears,
        Horizon::FiveYears,
        Horizon::TenYears,
        Horizon::TwentyYears,
        Horizon::ThirtyYears,
    ];

    /// Length of the window in days (a year counts as 365 days).
    pub fn days(&self) -> i64 {
        match self {
            Horizon::ThreeMonths => 90,
            Horizon::OneYear => 365,
            Horizon::TwoYears => 365 * 2,
            Horizon::FiveYears => 365 * 5,
            Horizon::TenYears => 365 * 10,
            Horizon::TwentyYears => 365 * 20,
            Horizon::ThirtyYears => 365 * 30,
        }
    }

    /// Button label: `3m`, `1y`, ... `30y`.
    pub fn label(&self) -> &'static str {
        match self {
            Horizon::ThreeMonths => "3m",
            Horizon::OneYear => "1y",
            Horizon::TwoYears => "2y",
            Horizon::FiveYears => "5y",
            Horizon::TenYears => "10y",
            Horizon::TwentyYears => "20y",
            Horizon::ThirtyYears => "30y",
        }
    }

    /// Long horizons are shown with a "may not be as accurate" caution.
    pub fn is_speculative(&self) -> bool {
        self.days() >= Horizon::FiveYears.days()
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Horizon {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Horizon::ALL
            .into_iter()
            .find(|h| h.label() == wanted)
            .ok_or_else(|| CoreError::Config(format!("unknown horizon {s:?}")))
    }
}

/// Which presentation of the projection is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChartTab {
    #[default]
    DisposableIncome,
    Uncertainty,
    BalanceCandles,
    WorkingCapitalCandles,
}

impl ChartTab {
    pub const ALL: [ChartTab; 4] = [
        ChartTab::DisposableIncome,
        ChartTab::Uncertainty,
        ChartTab::BalanceCandles,
        ChartTab::WorkingCapitalCandles,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartTab::DisposableIncome => "Disposable Income",
            ChartTab::Uncertainty => "Uncertainty",
            ChartTab::BalanceCandles => "Balance Candles",
            ChartTab::WorkingCapitalCandles => "Working Capital Candles",
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            ChartTab::DisposableIncome => ChartKind::SteppedArea,
            ChartTab::Uncertainty => ChartKind::Line,
            ChartTab::BalanceCandles | ChartTab::WorkingCapitalCandles => ChartKind::Candlestick,
        }
    }
}

/// The chart type a renderer should draw a table as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    SteppedArea,
    Line,
    Candlestick,
}

/// One row of a chart table: the day plus one number per series column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

/// Renderer-ready chart data.
///
/// `columns[0]` is always `"Day"`; each row carries `columns.len() - 1` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTable {
    pub kind: ChartKind,
    pub columns: Vec<String>,
    /// One colour per series (empty for candlesticks)
    pub colors: Vec<String>,
    pub rows: Vec<ChartRow>,
}
