use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of model inputs per row.
pub const FEATURE_COUNT: usize = 4;

/// Column names, in the order of [`FeatureRow::as_vector`].
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["rsi", "macd", "macd_signal", "price_change_pct"];

/// Model inputs for a single trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub price_change_pct: f64,
}

impl FeatureRow {
    /// The inputs the classifier sees.
    pub fn as_vector(&self) -> [f64; FEATURE_COUNT] {
        [self.rsi, self.macd, self.macd_signal, self.price_change_pct]
    }
}

/// Labeled training rows plus the most recent, unlabeled row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    /// Rows with a known next-day outcome, chronological.
    pub rows: Vec<FeatureRow>,
    /// `labels[i]` is true when the close after `rows[i]` was higher.
    pub labels: Vec<bool>,
    /// Final row of the series. Only ever used for prediction.
    pub latest: FeatureRow,
}

impl FeatureSet {
    /// Number of labeled rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Predicted next-day direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Price expected to rise (class 1).
    #[serde(rename = "BUY")]
    Up,
    /// Price expected to fall or stay flat (class 0).
    #[serde(rename = "SELL")]
    Down,
}

impl Direction {
    pub fn from_label(up: bool) -> Self {
        if up {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    /// Ledger text for the direction.
    pub fn action_text(&self) -> &'static str {
        match self {
            Direction::Up => "BUY",
            Direction::Down => "SELL",
        }
    }

    /// Get display label for this direction.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "Price will go UP (BUY)",
            Direction::Down => "Price will go DOWN (SELL)",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.action_text())
    }
}
