//! Relative Strength Index (RSI) indicator.

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses.
/// Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    /// Minimum number of closes before the first value is defined.
    pub fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            return if avg_gain == 0.0 { 50.0 } else { 100.0 };
        }
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }

    /// Full-length RSI aligned with `closes`; `None` before index `period`.
    pub fn series(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![None; closes.len()];
        if closes.len() < self.min_periods() {
            return out;
        }

        let mut gains = Vec::with_capacity(closes.len() - 1);
        let mut losses = Vec::with_capacity(closes.len() - 1);
        for pair in closes.windows(2) {
            let change = pair[1] - pair[0];
            if change > 0.0 {
                gains.push(change);
                losses.push(0.0);
            } else {
                gains.push(0.0);
                losses.push(-change);
            }
        }

        let period = self.period as f64;

        // Calculate initial averages
        let mut avg_gain: f64 = gains.iter().take(self.period).sum::<f64>() / period;
        let mut avg_loss: f64 = losses.iter().take(self.period).sum::<f64>() / period;
        out[self.period] = Some(Self::rsi_value(avg_gain, avg_loss));

        // Wilder smoothing for the rest; change i ends at close i + 1
        for i in self.period..gains.len() {
            avg_gain = (avg_gain * (period - 1.0) + gains[i]) / period;
            avg_loss = (avg_loss * (period - 1.0) + losses[i]) / period;
            out[i + 1] = Some(Self::rsi_value(avg_gain, avg_loss));
        }

        out
    }
}
