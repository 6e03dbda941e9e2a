//! Dashboard pipeline.
//!
//! One call per user interaction: fetch (cached) → indicators → features →
//! prediction (cached model) → ledgers → summary. Failures along the way
//! are collected as [`Notice`]s so the dashboard always has something to
//! render.

use crate::config::Config;
use crate::error::AppError;
use crate::services::cache::{DataVersion, ModelCache, SeriesCache};
use crate::services::features::FeatureBuilder;
use crate::services::indicators::IndicatorEngine;
use crate::services::predictor::{Predictor, PredictorConfig};
use crate::services::simulator::TradeSimulator;
use crate::services::summary::PerformanceSummarizer;
use crate::sources::MarketDataSource;
use crate::types::{
    round2, Direction, IndicatorRow, PerformanceSummary, PredictionLogEntry, PriceBar, Selection,
    TradeAction, TradeLogEntry,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A user-facing message produced while running the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Result of the prediction stage.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Predicted(Direction),
    NoPrediction(String),
}

impl PredictionOutcome {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            PredictionOutcome::Predicted(d) => Some(*d),
            PredictionOutcome::NoPrediction(_) => None,
        }
    }
}

/// Everything the dashboard renders for one interaction.
#[derive(Debug, Clone)]
pub struct Report {
    pub selection: Selection,
    pub bars: Arc<Vec<PriceBar>>,
    pub indicators: Vec<IndicatorRow>,
    pub outcome: PredictionOutcome,
    /// Trade recorded by this interaction, if any.
    pub executed_trade: Option<TradeLogEntry>,
    pub trade_history: Vec<TradeLogEntry>,
    pub prediction_history: Vec<PredictionLogEntry>,
    pub summary: PerformanceSummary,
    pub notices: Vec<Notice>,
}

impl Report {
    /// Latest close rounded to two decimals.
    pub fn latest_price(&self) -> Option<f64> {
        self.bars.last().map(|b| round2(b.close))
    }

    /// Most severe notice level, if any.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.notices.iter().map(|n| n.severity).max()
    }
}

/// Pipeline tuning.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Bars required before a prediction is attempted.
    pub min_training_rows: usize,
    pub series_ttl: Duration,
    pub predictor: PredictorConfig,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_training_rows: 30,
            series_ttl: Duration::from_secs(3600),
            predictor: PredictorConfig::default(),
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            min_training_rows: config.min_training_rows,
            series_ttl: Duration::from_secs(config.series_cache_ttl_secs),
            predictor: PredictorConfig::from(&config.forest),
        }
    }
}

/// Output of the data and model stages.
struct Evaluation {
    bars: Arc<Vec<PriceBar>>,
    indicators: Vec<IndicatorRow>,
    outcome: PredictionOutcome,
    notices: Vec<Notice>,
}

pub struct Pipeline<S> {
    source: S,
    engine: IndicatorEngine,
    builder: FeatureBuilder,
    predictor: Predictor,
    simulator: TradeSimulator,
    series_cache: SeriesCache,
    model_cache: ModelCache,
    min_training_rows: usize,
}

impl<S: MarketDataSource + Send + Sync> Pipeline<S> {
    pub fn new(source: S, simulator: TradeSimulator, settings: PipelineSettings) -> Self {
        Self {
            source,
            engine: IndicatorEngine::default(),
            builder: FeatureBuilder::new(),
            predictor: Predictor::new(settings.predictor),
            simulator,
            series_cache: SeriesCache::new(settings.series_ttl),
            model_cache: ModelCache::new(),
            min_training_rows: settings.min_training_rows,
        }
    }

    pub fn simulator(&self) -> &TradeSimulator {
        &self.simulator
    }

    /// Run the full pipeline for a selection.
    pub async fn run(&self, sel: &Selection) -> Report {
        let eval = self.evaluate(sel).await;
        self.finish(sel, eval, None)
    }

    /// Run the pipeline, then record a simulated trade at the latest close.
    ///
    /// The trade is only recorded when a prediction was produced.
    pub async fn execute_trade(&self, sel: &Selection, action: TradeAction) -> Report {
        let mut eval = self.evaluate(sel).await;

        let price = eval.bars.last().map(|b| round2(b.close));
        let executed = match (eval.outcome.direction(), price) {
            (Some(prediction), Some(price)) => {
                match self
                    .simulator
                    .record_trade(&sel.ticker, action, price, prediction)
                {
                    Ok(entry) => {
                        eval.notices.push(Notice::info(format!(
                            "Trade executed: {} at {:.2}",
                            action, price
                        )));
                        Some(entry)
                    }
                    Err(e) => {
                        warn!("Failed to record trade for {}: {}", sel.ticker, e);
                        eval.notices
                            .push(Notice::warning(format!("Could not record trade: {}", e)));
                        None
                    }
                }
            }
            _ => {
                eval.notices.push(Notice::warning(format!(
                    "{} skipped: no prediction available for {}",
                    action, sel.ticker
                )));
                None
            }
        };

        self.finish(sel, eval, executed)
    }

    /// Drop cached series and models for a selection.
    pub fn refresh(&self, sel: &Selection) {
        self.series_cache.invalidate(sel);
        self.model_cache.invalidate(sel);
        info!("Cleared cached data for {}", sel);
    }

    async fn fetch(&self, sel: &Selection) -> Result<Arc<Vec<PriceBar>>, AppError> {
        self.series_cache.cleanup();
        if let Some(bars) = self.series_cache.get(sel) {
            debug!("Series cache hit for {}", sel);
            return Ok(bars);
        }

        debug!("Fetching {} from {}", sel, self.source.name());
        let bars = Arc::new(
            self.source
                .fetch_daily(&sel.ticker, sel.start, sel.end)
                .await?,
        );
        // Empty answers are not cached so a retry can pick up new data.
        if !bars.is_empty() {
            self.series_cache.insert(sel, bars.clone());
        }
        Ok(bars)
    }

    fn predict(&self, sel: &Selection, bars: &[PriceBar], indicators: &[IndicatorRow]) -> Result<Direction, AppError> {
        let features = self.builder.build(indicators)?;
        let version = DataVersion::of(bars);

        let model = match self.model_cache.get(sel, &version) {
            Some(model) => {
                debug!("Model cache hit for {} ({} training rows)", sel, model.train_rows());
                model
            }
            None => {
                let model = Arc::new(self.predictor.train(&features)?);
                self.model_cache.insert(sel, version, model.clone());
                model
            }
        };

        Ok(model.predict(&features.latest))
    }

    async fn evaluate(&self, sel: &Selection) -> Evaluation {
        let mut notices = Vec::new();

        let bars = match self.fetch(sel).await {
            Ok(bars) => bars,
            Err(e) => {
                error!("Fetch failed for {}: {}", sel, e);
                notices.push(Notice::error(format!("Failed to fetch {}: {}", sel.ticker, e)));
                Arc::new(Vec::new())
            }
        };

        if bars.is_empty() {
            if notices.is_empty() {
                warn!("No data for {}", sel);
                notices.push(Notice::warning("No data available for the selected range."));
            }
            return Evaluation {
                bars,
                indicators: Vec::new(),
                outcome: PredictionOutcome::NoPrediction("no data".to_string()),
                notices,
            };
        }

        let indicators = self.engine.apply(&bars);

        let outcome = if bars.len() < self.min_training_rows {
            warn!(
                "{} has {} bars, need {} to predict",
                sel,
                bars.len(),
                self.min_training_rows
            );
            notices.push(Notice::warning(
                "Not enough data to make a prediction. Try selecting a wider date range.",
            ));
            PredictionOutcome::NoPrediction(format!(
                "{} bars, need {}",
                bars.len(),
                self.min_training_rows
            ))
        } else {
            match self.predict(sel, &bars, &indicators) {
                Ok(direction) => {
                    info!("Prediction for {}: {}", sel.ticker, direction.label());
                    if let Err(e) = self.simulator.record_prediction(&sel.ticker, direction) {
                        warn!("Failed to log prediction: {}", e);
                        notices.push(Notice::warning(format!("Could not log prediction: {}", e)));
                    }
                    PredictionOutcome::Predicted(direction)
                }
                Err(e) => {
                    warn!("Prediction failed for {}: {}", sel, e);
                    let message = format!("Could not generate prediction: {}", e);
                    notices.push(if e.is_data_unavailable() {
                        Notice::warning(message)
                    } else {
                        Notice::error(message)
                    });
                    PredictionOutcome::NoPrediction(e.to_string())
                }
            }
        };

        Evaluation {
            bars,
            indicators,
            outcome,
            notices,
        }
    }

    fn finish(&self, sel: &Selection, eval: Evaluation, executed_trade: Option<TradeLogEntry>) -> Report {
        let Evaluation {
            bars,
            indicators,
            outcome,
            mut notices,
        } = eval;

        let trades = self.simulator.trades().unwrap_or_else(|e| {
            warn!("Failed to read trade ledger: {}", e);
            notices.push(Notice::warning(format!("Could not read trade history: {}", e)));
            Vec::new()
        });
        let prediction_history = self.simulator.prediction_history().unwrap_or_else(|e| {
            warn!("Failed to read prediction log: {}", e);
            notices.push(Notice::warning(format!("Could not read prediction log: {}", e)));
            Vec::new()
        });

        let summary = PerformanceSummarizer::summarize(&trades);
        let mut trade_history = trades;
        trade_history.reverse();

        Report {
            selection: sel.clone(),
            bars,
            indicators,
            outcome,
            executed_trade,
            trade_history,
            prediction_history,
            summary,
            notices,
        }
    }
}
