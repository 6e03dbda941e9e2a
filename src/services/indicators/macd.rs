//! MACD (Moving Average Convergence Divergence) indicator.

use super::Ema;

/// MACD line and signal line, aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period: fast_period.max(1),
            slow_period: slow_period.max(fast_period).max(1),
            signal_period: signal_period.max(1),
        }
    }

    /// Closes needed before the signal line is defined.
    pub fn min_periods(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }

    pub fn series(&self, closes: &[f64]) -> MacdSeries {
        let fast = Ema::new(self.fast_period).series(closes);
        let slow = Ema::new(self.slow_period).series(closes);

        let macd: Vec<Option<f64>> = fast
            .iter()
            .zip(slow.iter())
            .map(|(f, s)| match (f, s) {
                (Some(f), Some(s)) => Some(f - s),
                _ => None,
            })
            .collect();

        let signal = Ema::new(self.signal_period).series_from_partial(&macd);

        MacdSeries { macd, signal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closes(count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0 + i as f64 * 0.2)
            .collect()
    }

    #[test]
    fn test_macd_min_periods() {
        assert_eq!(Macd::default().min_periods(), 34);
    }

    #[test]
    fn test_macd_alignment() {
        let series = Macd::default().series(&closes(60));
        assert_eq!(series.macd.len(), 60);
        assert_eq!(series.signal.len(), 60);

        assert!(series.macd[..25].iter().all(Option::is_none));
        assert!(series.macd[25..].iter().all(Option::is_some));
        assert!(series.signal[..33].iter().all(Option::is_none));
        assert!(series.signal[33..].iter().all(Option::is_some));
    }

    #[test]
    fn test_macd_insufficient_data() {
        let series = Macd::default().series(&closes(20));
        assert!(series.macd.iter().all(Option::is_none));
        assert!(series.signal.iter().all(Option::is_none));
    }

    #[test]
    fn test_macd_uptrend_positive() {
        let rising: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        let series = Macd::default().series(&rising);
        let macd = series.macd.last().copied().flatten().unwrap();
        assert!(macd > 0.0, "MACD in uptrend should be positive, got {}", macd);
    }

    #[test]
    fn test_macd_flat_is_zero() {
        let series = Macd::default().series(&[50.0; 40]);
        assert_eq!(series.macd[39], Some(0.0));
        assert_eq!(series.signal[39], Some(0.0));
    }
}
