//! Ledger persistence and P/L summary tests.

use autotrade::services::{CsvLedger, LedgerStore, PerformanceSummarizer, TradeSimulator};
use autotrade::types::{Direction, PositionState, PredictionLogEntry, TradeAction, TradeLogEntry};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::path::PathBuf;
use std::sync::Arc;

struct TestDir(PathBuf);

impl TestDir {
    fn new(name: &str) -> Self {
        let dir = PathBuf::from(format!(".test_ledger_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        Self(dir)
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap()
}

fn entries(actions: &[(TradeAction, f64)]) -> Vec<TradeLogEntry> {
    actions
        .iter()
        .enumerate()
        .map(|(i, (action, price))| TradeLogEntry {
            timestamp: start() + Duration::seconds(i as i64 * 90),
            ticker: "INFY.NS".to_string(),
            action: *action,
            price: *price,
            prediction: if i % 2 == 0 { Direction::Up } else { Direction::Down },
        })
        .collect()
}

#[test]
fn test_round_trip_preserves_rows_and_order() {
    let dir = TestDir::new("it_roundtrip");
    let ledger: CsvLedger<TradeLogEntry> = CsvLedger::new(dir.0.join("fake_trades.csv"));

    let written = entries(&[
        (TradeAction::Buy, 1450.1),
        (TradeAction::Sell, 1462.35),
        (TradeAction::Buy, 1470.0),
        (TradeAction::Buy, 1468.75),
    ]);
    for entry in &written {
        ledger.append(entry).unwrap();
    }

    let read = ledger.read_all().unwrap();
    assert_eq!(read.len(), written.len());
    assert_eq!(read, written);
}

#[test]
fn test_summary_over_persisted_ledger() {
    use TradeAction::*;
    let dir = TestDir::new("it_summary");
    let ledger: CsvLedger<TradeLogEntry> = CsvLedger::new(dir.0.join("fake_trades.csv"));
    for entry in entries(&[(Buy, 100.0), (Sell, 110.0), (Buy, 90.0), (Sell, 80.0)]) {
        ledger.append(&entry).unwrap();
    }

    let summary = PerformanceSummarizer::summarize(&ledger.read_all().unwrap());

    let pnl: Vec<f64> = summary.closed_trades.iter().map(|t| t.profit_loss).collect();
    assert_eq!(pnl, vec![10.0, -10.0]);
    assert_eq!(summary.total_pnl, 0.0);
    assert_eq!(summary.win_rate_pct, 50.0);
    assert_eq!(summary.trade_count, 2);
    assert_eq!(summary.closed_trades[1].exit_timestamp, start() + Duration::seconds(270));
}

#[test]
fn test_dangling_sell_and_double_buy() {
    use TradeAction::*;
    let dangling = PerformanceSummarizer::summarize(&entries(&[(Sell, 100.0)]));
    assert_eq!(dangling.trade_count, 0);
    assert!(dangling.closed_trades.is_empty());

    let double = PerformanceSummarizer::summarize(&entries(&[(Buy, 100.0), (Buy, 90.0), (Sell, 95.0)]));
    assert_eq!(double.trade_count, 1);
    assert_eq!(double.closed_trades[0].entry_price, 90.0);
    assert_eq!(double.open_position, PositionState::Flat);
}

#[test]
fn test_ledger_written_by_older_tool() {
    let dir = TestDir::new("it_legacy");
    std::fs::create_dir_all(&dir.0).unwrap();
    let path = dir.0.join("trade_log.csv");
    std::fs::write(
        &path,
        "2024-01-05 10:00:00,TCS.NS,BUY\n2024-01-05 10:05:00,TCS.NS,SELL\nnot,a,row\n",
    )
    .unwrap();

    let ledger: CsvLedger<PredictionLogEntry> = CsvLedger::new(&path);
    let read = ledger.read_all().unwrap();
    assert_eq!(read.len(), 2);
    assert_eq!(read[0].prediction, Direction::Up);
    assert_eq!(read[1].prediction, Direction::Down);
}

#[test]
fn test_simulator_over_csv_ledgers() {
    let dir = TestDir::new("it_simulator");
    let trades: Arc<dyn LedgerStore<TradeLogEntry>> = Arc::new(CsvLedger::new(dir.0.join("fake_trades.csv")));
    let predictions: Arc<dyn LedgerStore<PredictionLogEntry>> =
        Arc::new(CsvLedger::new(dir.0.join("trade_log.csv")));
    let simulator = TradeSimulator::new(trades, predictions);

    simulator
        .record_trade("HDFCBANK.NS", TradeAction::Buy, 1601.4, Direction::Up)
        .unwrap();
    simulator
        .record_trade("HDFCBANK.NS", TradeAction::Sell, 1623.9, Direction::Down)
        .unwrap();
    simulator.record_prediction("HDFCBANK.NS", Direction::Down).unwrap();

    let history = simulator.trade_history().unwrap();
    assert_eq!(history[0].action, TradeAction::Sell);
    assert_eq!(history[1].price, 1601.4);
    assert_eq!(simulator.prediction_history().unwrap().len(), 1);

    let summary = PerformanceSummarizer::summarize(&simulator.trades().unwrap());
    assert_eq!(summary.total_pnl, 22.5);
    assert_eq!(summary.win_rate_pct, 100.0);
}
