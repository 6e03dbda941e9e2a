pub mod cache;
pub mod features;
pub mod forest;
pub mod indicators;
pub mod ledger;
pub mod pipeline;
pub mod predictor;
pub mod simulator;
pub mod summary;

pub use cache::{Cache, DataVersion, ModelCache, SeriesCache};
pub use features::FeatureBuilder;
pub use forest::{ForestParams, RandomForest};
pub use indicators::{IndicatorEngine, Macd, Rsi};
pub use ledger::{CsvLedger, LedgerStore, MemoryLedger};
pub use pipeline::{Notice, Pipeline, PipelineSettings, PredictionOutcome, Report, Severity};
pub use predictor::{Predictor, PredictorConfig, TrainedModel};
pub use simulator::TradeSimulator;
pub use summary::PerformanceSummarizer;
