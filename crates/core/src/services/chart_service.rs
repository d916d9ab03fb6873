use crate::models::chart::{ChartKind, ChartRow, ChartTab, ChartTable, BALANCE_COLOR, GREEN, RED};
use crate::models::daybyday::{Candle, DayByDay, ProjectionSeries};

/// Turns a projection series into chart-ready tables.
///
/// The core computes all the numbers; the frontend only renders.
/// Line and area charts plot each day's `low` figure, which is the
/// conservative end of that day's range.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Build the table for `tab`. Returns `None` for an empty series, which
    /// the view shows as its own state rather than as an empty chart.
    pub fn build(&self, tab: ChartTab, series: &ProjectionSeries) -> Option<ChartTable> {
        if series.is_empty() {
            return None;
        }
        let points = series.points();
        let table = match tab {
            ChartTab::DisposableIncome => Self::table(
                ChartKind::SteppedArea,
                &["Balance", "Disposable Income"],
                &[BALANCE_COLOR, GREEN],
                points,
                |p| vec![p.balance.low, p.working_capital.low],
            ),
            ChartTab::Uncertainty => Self::table(
                ChartKind::Line,
                &["90th Percentile", "Expected", "10th Percentile"],
                &[GREEN, BALANCE_COLOR, RED],
                points,
                |p| vec![p.high_prediction.low, p.balance.low, p.low_prediction.low],
            ),
            ChartTab::BalanceCandles => Self::candles(points, |p| &p.balance),
            ChartTab::WorkingCapitalCandles => Self::candles(points, |p| &p.working_capital),
        };
        Some(table)
    }

    fn table(
        kind: ChartKind,
        series: &[&str],
        colors: &[&str],
        points: &[DayByDay],
        values: impl Fn(&DayByDay) -> Vec<f64>,
    ) -> ChartTable {
        let mut columns = vec!["Day".to_string()];
        columns.extend(series.iter().map(|s| s.to_string()));
        ChartTable {
            kind,
            columns,
            colors: colors.iter().map(|c| c.to_string()).collect(),
            rows: points
                .iter()
                .map(|p| ChartRow {
                    date: p.date,
                    values: values(p),
                })
                .collect(),
        }
    }

    /// Candlestick rows in the low/open/close/high order candlestick renderers expect.
    fn candles(points: &[DayByDay], candle: impl Fn(&DayByDay) -> &Candle) -> ChartTable {
        Self::table(
            ChartKind::Candlestick,
            &["Low", "Open", "Close", "High"],
            &[],
            points,
            |p| {
                let c = candle(p);
                vec![c.low, c.open, c.close, c.high]
            },
        )
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
