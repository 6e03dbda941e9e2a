use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Whether the bar carries a usable close.
    pub fn is_valid(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Sort bars by date, keep the last bar for a repeated date and drop bars
/// without a usable close.
///
/// The result is strictly increasing in `date`.
pub fn normalize_series(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.retain(PriceBar::is_valid);
    // Stable sort keeps provider order within a date, so the last one wins below.
    bars.sort_by_key(|b| b.date);

    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

/// A price bar with the indicator columns attached.
///
/// Indicator values are `None` while the lookback window is still filling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub bar: PriceBar,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

impl IndicatorRow {
    /// True when every indicator column is defined and finite.
    pub fn is_complete(&self) -> bool {
        [self.rsi, self.macd, self.macd_signal]
            .iter()
            .all(|v| v.map(f64::is_finite).unwrap_or(false))
    }
}

/// Identifies a series request: ticker plus date range (end exclusive).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Selection {
    pub fn new(ticker: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            start,
            end,
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{} .. {})", self.ticker, self.start, self.end)
    }
}
