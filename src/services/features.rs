//! Feature and label construction from indicator rows.

use crate::error::{AppError, Result};
use crate::types::{FeatureRow, FeatureSet, IndicatorRow};

/// Builds classifier inputs and next-day labels.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Drop incomplete rows, derive the percent change from the previous
    /// kept close, and label each row with whether the next close is higher.
    ///
    /// The last row has no next close; it becomes `latest` and is never
    /// labeled.
    pub fn build(&self, rows: &[IndicatorRow]) -> Result<FeatureSet> {
        let complete: Vec<&IndicatorRow> = rows.iter().filter(|r| r.is_complete()).collect();

        let mut features: Vec<FeatureRow> = Vec::with_capacity(complete.len());
        for pair in complete.windows(2) {
            let (prev, row) = (pair[0], pair[1]);
            let price_change_pct = (row.bar.close / prev.bar.close - 1.0) * 100.0;
            if !price_change_pct.is_finite() {
                continue;
            }

            features.push(FeatureRow {
                date: row.bar.date,
                close: row.bar.close,
                rsi: row.rsi.unwrap_or_default(),
                macd: row.macd.unwrap_or_default(),
                macd_signal: row.macd_signal.unwrap_or_default(),
                price_change_pct,
            });
        }

        let Some(latest) = features.pop() else {
            return Err(AppError::InsufficientData {
                needed: 2,
                available: complete.len(),
            });
        };

        let mut labels: Vec<bool> = features
            .windows(2)
            .map(|pair| pair[1].close > pair[0].close)
            .collect();
        if let Some(last) = features.last() {
            labels.push(latest.close > last.close);
        }

        Ok(FeatureSet {
            rows: features,
            labels,
            latest,
        })
    }
}
