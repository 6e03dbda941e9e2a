use autotrade::config::Config;
use autotrade::services::{CsvLedger, LedgerStore, Pipeline, PipelineSettings, TradeSimulator};
use autotrade::sources::YahooFinanceClient;
use autotrade::tui::{run_tui, App, LogBuffer, LogMakeWriter, SessionState};
use autotrade::types::{PredictionLogEntry, TradeLogEntry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Lines of log output kept for the Logs view.
const LOG_CAPACITY: usize = 2_000;

/// CSV ledgers under the log directory, or in-memory ones if it can't be created.
fn simulator(config: &Config) -> TradeSimulator {
    if let Err(e) = std::fs::create_dir_all(&config.log_dir) {
        warn!(
            "Log directory {} unusable ({}), keeping ledgers in memory",
            config.log_dir.display(),
            e
        );
        return TradeSimulator::in_memory();
    }

    let trades: Arc<dyn LedgerStore<TradeLogEntry>> = Arc::new(CsvLedger::new(config.trade_log_path()));
    let predictions: Arc<dyn LedgerStore<PredictionLogEntry>> =
        Arc::new(CsvLedger::new(config.prediction_log_path()));
    TradeSimulator::new(trades, predictions)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // The terminal belongs to the dashboard, so logs go to the Logs view.
    let log_buffer = Arc::new(LogBuffer::new(LOG_CAPACITY));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autotrade=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(LogMakeWriter::new(log_buffer.clone())),
        )
        .init();

    let config = Config::from_env();
    info!(
        "Starting AutoTrade with {} tickers, range {} .. {}",
        config.tickers.len(),
        config.start_date,
        config.end_date
    );

    let source = YahooFinanceClient::new(Duration::from_secs(config.http_timeout_secs))?;
    let pipeline = Pipeline::new(source, simulator(&config), PipelineSettings::from(&config));

    let session = SessionState::new(config.tickers.clone(), config.start_date, config.end_date);
    run_tui(App::new(pipeline, session, log_buffer)).await?;

    info!("AutoTrade stopped");
    Ok(())
}
