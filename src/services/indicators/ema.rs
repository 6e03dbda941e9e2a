//! Exponential Moving Average (EMA).

/// EMA (Exponential Moving Average) over a value series.
///
/// Seeded with the SMA of the first `period` values, then smoothed with
/// `2 / (period + 1)`.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Full-length EMA aligned with `values`; `None` before index `period - 1`.
    pub fn series(&self, values: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![None; values.len()];
        if values.len() < self.period {
            return out;
        }

        let multiplier = 2.0 / (self.period as f64 + 1.0);

        // First EMA is SMA
        let mut ema = values.iter().take(self.period).sum::<f64>() / self.period as f64;
        out[self.period - 1] = Some(ema);

        for (i, value) in values.iter().enumerate().skip(self.period) {
            ema = (value - ema) * multiplier + ema;
            out[i] = Some(ema);
        }

        out
    }

    /// EMA over a series whose leading values may be undefined.
    ///
    /// The window starts at the first defined value; later gaps are not expected.
    pub fn series_from_partial(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let Some(first) = values.iter().position(Option::is_some) else {
            return vec![None; values.len()];
        };

        let defined: Vec<f64> = values[first..].iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        let mut out = vec![None; first];
        out.extend(self.series(&defined));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_insufficient_data() {
        let ema = Ema::new(5);
        let out = ema.series(&[1.0, 2.0, 3.0]);
        assert_eq!(out, vec![None, None, None]);
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let ema = Ema::new(3);
        let out = ema.series(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(2.0));
        // (4 - 2) * 0.5 + 2
        assert_eq!(out[3], Some(3.0));
    }

    #[test]
    fn test_ema_constant_series() {
        let ema = Ema::new(4);
        let out = ema.series(&[7.0; 10]);
        assert!(out.iter().skip(3).all(|v| *v == Some(7.0)));
    }

    #[test]
    fn test_ema_from_partial_keeps_alignment() {
        let ema = Ema::new(2);
        let out = ema.series_from_partial(&[None, None, Some(2.0), Some(4.0), Some(6.0)]);
        assert_eq!(out.len(), 5);
        assert_eq!(out[2], None);
        assert_eq!(out[3], Some(3.0));
        assert!(out[4].is_some());
    }

    #[test]
    fn test_ema_from_partial_all_undefined() {
        let ema = Ema::new(2);
        assert_eq!(ema.series_from_partial(&[None, None]), vec![None, None]);
    }
}
