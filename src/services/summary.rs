//! Realized profit/loss from the trade ledger.

use crate::types::{round2, ClosedTrade, PerformanceSummary, PositionState, TradeAction, TradeLogEntry};

/// Replays the ledger as a single long-only position.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerformanceSummarizer;

impl PerformanceSummarizer {
    /// Summarize chronologically ordered trades.
    ///
    /// A BUY opens a position, or moves the entry price if one is already
    /// open. A SELL closes an open position and is ignored when flat.
    /// Trades pair across tickers in ledger order.
    pub fn summarize(entries: &[TradeLogEntry]) -> PerformanceSummary {
        let mut position = PositionState::Flat;
        let mut closed_trades = Vec::new();

        for entry in entries {
            position = match (entry.action, position) {
                (TradeAction::Buy, _) => PositionState::Long {
                    entry_price: entry.price,
                },
                (TradeAction::Sell, PositionState::Long { entry_price }) => {
                    closed_trades.push(ClosedTrade {
                        entry_price,
                        exit_price: entry.price,
                        profit_loss: round2(entry.price - entry_price),
                        exit_timestamp: entry.timestamp,
                    });
                    PositionState::Flat
                }
                (TradeAction::Sell, PositionState::Flat) => PositionState::Flat,
            };
        }

        let wins = closed_trades.iter().filter(|t| t.is_winner()).count();
        let win_rate_pct = if closed_trades.is_empty() {
            0.0
        } else {
            round2(wins as f64 / closed_trades.len() as f64 * 100.0)
        };
        let total_pnl = round2(closed_trades.iter().map(|t| t.profit_loss).sum());

        PerformanceSummary {
            trade_count: closed_trades.len(),
            closed_trades,
            total_pnl,
            win_rate_pct,
            open_position: position,
        }
    }
}
