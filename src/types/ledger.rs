use super::Direction;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Side of a simulated trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

/// Ledger timestamps are local wall-clock time at second precision.
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }

    /// Current local time truncated to whole seconds.
    pub fn now() -> NaiveDateTime {
        use chrono::Timelike;
        let now = chrono::Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// One user-initiated simulated trade.
///
/// Field order is the on-disk column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLogEntry {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub ticker: String,
    pub action: TradeAction,
    pub price: f64,
    pub prediction: Direction,
}

/// One successful model prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionLogEntry {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub ticker: String,
    pub prediction: Direction,
}

/// A BUY matched with a later SELL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedTrade {
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit_loss: f64,
    #[serde(with = "timestamp_format")]
    pub exit_timestamp: NaiveDateTime,
}

impl ClosedTrade {
    pub fn is_winner(&self) -> bool {
        self.profit_loss > 0.0
    }
}

/// Position state while replaying the ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat,
    Long { entry_price: f64 },
}

/// Realized performance over the whole ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub closed_trades: Vec<ClosedTrade>,
    pub total_pnl: f64,
    pub win_rate_pct: f64,
    pub trade_count: usize,
    #[serde(skip)]
    pub open_position: PositionState,
}

impl PerformanceSummary {
    pub fn is_empty(&self) -> bool {
        self.closed_trades.is_empty()
    }
}

/// Round a money or percentage value to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
