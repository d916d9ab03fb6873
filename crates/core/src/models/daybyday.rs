use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::de;
use crate::errors::CoreError;

/// Open/low/high/close of one projected figure over a single day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(deserialize_with = "de::number_or_string")]
    pub open: f64,
    #[serde(deserialize_with = "de::number_or_string")]
    pub low: f64,
    #[serde(deserialize_with = "de::number_or_string")]
    pub high: f64,
    #[serde(deserialize_with = "de::number_or_string")]
    pub close: f64,
}

impl Candle {
    /// A flat candle where every figure equals `value`.
    pub fn flat(value: f64) -> Self {
        Self {
            open: value,
            low: value,
            high: value,
            close: value,
        }
    }
}

/// One day of the backend's forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayByDay {
    #[serde(deserialize_with = "de::flexible_date")]
    pub date: NaiveDate,

    /// Expected account balance
    pub balance: Candle,

    /// Disposable income: what can be spent without going under later on
    pub working_capital: Candle,

    /// 90th percentile balance
    pub high_prediction: Candle,

    /// 10th percentile balance
    pub low_prediction: Candle,
}

/// `{ "daybydays": [...] }` envelope of the projection endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DayByDayResponse {
    #[serde(default)]
    pub daybydays: Vec<DayByDay>,
}

/// The `[start, end]` instants a projection is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ProjectionWindow {
    pub fn new(origin: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: origin,
            end: origin + Duration::days(days),
        }
    }

    /// ISO 8601 in UTC with milliseconds: `2021-01-01T00:00:00.000Z`.
    pub fn start_param(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn end_param(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start.date_naive() && date <= self.end.date_naive()
    }
}

/// A validated projection: sorted by date with no day repeated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionSeries {
    points: Vec<DayByDay>,
}

impl ProjectionSeries {
    /// Sort the backend's points by date and reject duplicated days.
    ///
    /// Points outside `window` are kept but logged, since the backend owns
    /// the exact coverage of the range.
    pub fn from_points(
        mut points: Vec<DayByDay>,
        window: &ProjectionWindow,
    ) -> Result<Self, CoreError> {
        points.sort_by_key(|p| p.date);

        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(CoreError::InvalidSeries(format!(
                "date {} appears more than once",
                pair[0].date
            )));
        }

        let outside = points.iter().filter(|p| !window.contains(p.date)).count();
        if outside > 0 {
            tracing::warn!(
                outside,
                start = %window.start_param(),
                end = %window.end_param(),
                "projection points fall outside the requested window"
            );
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[DayByDay] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Lowest expected balance across the series and the day it happens.
    pub fn lowest_balance(&self) -> Option<(NaiveDate, f64)> {
        self.points
            .iter()
            .map(|p| (p.date, p.balance.low))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
