//! Paper trading against the ledgers.

use crate::error::Result;
use crate::services::ledger::{LedgerStore, MemoryLedger};
use crate::types::{timestamp_format, Direction, PredictionLogEntry, TradeAction, TradeLogEntry};
use std::sync::Arc;
use tracing::info;

/// Records simulated trades and predictions.
///
/// No position checks are made here: any BUY/SELL sequence is accepted
/// and interpreted later by the summarizer.
#[derive(Clone)]
pub struct TradeSimulator {
    trades: Arc<dyn LedgerStore<TradeLogEntry>>,
    predictions: Arc<dyn LedgerStore<PredictionLogEntry>>,
}

impl TradeSimulator {
    pub fn new(
        trades: Arc<dyn LedgerStore<TradeLogEntry>>,
        predictions: Arc<dyn LedgerStore<PredictionLogEntry>>,
    ) -> Self {
        Self {
            trades,
            predictions,
        }
    }

    /// Simulator backed by in-process ledgers.
    pub fn in_memory() -> Self {
        let trades: Arc<dyn LedgerStore<TradeLogEntry>> = Arc::new(MemoryLedger::<TradeLogEntry>::new());
        let predictions: Arc<dyn LedgerStore<PredictionLogEntry>> =
            Arc::new(MemoryLedger::<PredictionLogEntry>::new());
        Self::new(trades, predictions)
    }

    pub fn record_trade(
        &self,
        ticker: &str,
        action: TradeAction,
        price: f64,
        prediction: Direction,
    ) -> Result<TradeLogEntry> {
        let entry = TradeLogEntry {
            timestamp: timestamp_format::now(),
            ticker: ticker.to_string(),
            action,
            price,
            prediction,
        };
        self.trades.append(&entry)?;
        info!("Trade executed: {} {} at {:.2}", action, ticker, price);
        Ok(entry)
    }

    pub fn record_prediction(&self, ticker: &str, prediction: Direction) -> Result<PredictionLogEntry> {
        let entry = PredictionLogEntry {
            timestamp: timestamp_format::now(),
            ticker: ticker.to_string(),
            prediction,
        };
        self.predictions.append(&entry)?;
        info!("Prediction logged: {} {}", ticker, prediction.action_text());
        Ok(entry)
    }

    /// All trades, oldest first.
    pub fn trades(&self) -> Result<Vec<TradeLogEntry>> {
        self.trades.read_all()
    }

    /// Trades newest first, for display.
    pub fn trade_history(&self) -> Result<Vec<TradeLogEntry>> {
        let mut entries = self.trades.read_all()?;
        entries.reverse();
        Ok(entries)
    }

    /// Predictions newest first, for display.
    pub fn prediction_history(&self) -> Result<Vec<PredictionLogEntry>> {
        let mut entries = self.predictions.read_all()?;
        entries.reverse();
        Ok(entries)
    }
}
