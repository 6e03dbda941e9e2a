//! Technical indicator implementations.

pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::Ema;
pub use macd::{Macd, MacdSeries};
pub use rsi::Rsi;

use crate::types::{IndicatorRow, PriceBar};

/// Attaches RSI and MACD columns to a price series.
#[derive(Default)]
pub struct IndicatorEngine {
    rsi: Rsi,
    macd: Macd,
}

impl IndicatorEngine {
    pub fn new(rsi: Rsi, macd: Macd) -> Self {
        Self { rsi, macd }
    }

    /// Bars needed before every indicator column is defined.
    pub fn warmup_periods(&self) -> usize {
        self.rsi.min_periods().max(self.macd.min_periods())
    }

    /// One row per input bar, in the same order.
    ///
    /// Rows inside a lookback window carry `None` for that indicator.
    pub fn apply(&self, bars: &[PriceBar]) -> Vec<IndicatorRow> {
        if bars.is_empty() {
            return Vec::new();
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let rsi = self.rsi.series(&closes);
        let macd = self.macd.series(&closes);

        bars.iter()
            .enumerate()
            .map(|(i, bar)| IndicatorRow {
                bar: bar.clone(),
                rsi: rsi[i],
                macd: macd.macd[i],
                macd_signal: macd.signal[i],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bars(count: usize) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..count)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.5).sin() * 3.0;
                PriceBar {
                    date: start + Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_engine_empty_input() {
        assert!(IndicatorEngine::default().apply(&[]).is_empty());
    }

    #[test]
    fn test_engine_same_length() {
        let rows = IndicatorEngine::default().apply(&bars(50));
        assert_eq!(rows.len(), 50);
        assert_eq!(rows[10].bar.date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
    }

    #[test]
    fn test_engine_warmup() {
        let engine = IndicatorEngine::default();
        assert_eq!(engine.warmup_periods(), 34);

        let rows = engine.apply(&bars(50));
        let first_complete = rows.iter().position(IndicatorRow::is_complete);
        assert_eq!(first_complete, Some(33));
    }

    #[test]
    fn test_engine_short_series_never_complete() {
        let rows = IndicatorEngine::default().apply(&bars(20));
        assert!(rows.iter().all(|r| !r.is_complete()));
        assert!(rows.iter().all(|r| r.macd.is_none()));
    }
}
