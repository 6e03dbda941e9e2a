//! Next-day direction predictor.
//!
//! Trains a fresh random forest on a chronological split of the labeled
//! rows and classifies the most recent row. Holdout accuracy is only
//! logged.

use crate::config::ForestConfig;
use crate::error::{AppError, Result};
use crate::services::forest::{ForestParams, RandomForest};
use crate::types::{Direction, FeatureRow, FeatureSet, FEATURE_COUNT, FEATURE_NAMES};
use tracing::{debug, info};

/// Predictor settings.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub trees: usize,
    pub seed: u64,
    /// Share of the newest rows held out for accuracy reporting.
    pub test_fraction: f64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            trees: 100,
            seed: 42,
            test_fraction: 0.2,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

impl From<&ForestConfig> for PredictorConfig {
    fn from(forest: &ForestConfig) -> Self {
        Self {
            trees: forest.trees,
            seed: forest.seed,
            test_fraction: forest.test_fraction,
            ..Default::default()
        }
    }
}

/// Chronological train/test sizes: `(n_train, n_test)`.
///
/// The test partition takes `ceil(n * test_fraction)` of the newest rows.
pub fn split_sizes(n: usize, test_fraction: f64) -> Result<(usize, usize)> {
    if n < 2 {
        return Err(AppError::Prediction(format!(
            "need at least 2 labeled rows for a train/test split, have {}",
            n
        )));
    }

    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(AppError::Prediction(format!(
            "degenerate split of {} rows: train={} test={}",
            n, n_train, n_test
        )));
    }

    Ok((n_train, n_test))
}

/// A fitted model for one dataset.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    forest: RandomForest,
    train_rows: usize,
}

impl TrainedModel {
    pub fn predict(&self, row: &FeatureRow) -> Direction {
        Direction::from_label(self.forest.predict(&row.as_vector()))
    }

    /// Number of rows the model was fitted on.
    pub fn train_rows(&self) -> usize {
        self.train_rows
    }
}

/// Stateless trainer: every call fits from scratch.
#[derive(Debug, Clone, Default)]
pub struct Predictor {
    config: PredictorConfig,
}

impl Predictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    fn check_columns(set: &FeatureSet) -> Result<()> {
        for (col, name) in FEATURE_NAMES.iter().enumerate().take(FEATURE_COUNT) {
            let any_finite = set
                .rows
                .iter()
                .chain(std::iter::once(&set.latest))
                .any(|r| r.as_vector()[col].is_finite());
            if !any_finite {
                return Err(AppError::Prediction(format!("column {} has no values", name)));
            }
        }
        Ok(())
    }

    /// Fit on the oldest rows and log accuracy on the newest ones.
    pub fn train(&self, set: &FeatureSet) -> Result<TrainedModel> {
        let (n_train, n_test) = split_sizes(set.len(), self.config.test_fraction)?;
        Self::check_columns(set)?;

        let x: Vec<Vec<f64>> = set.rows.iter().map(|r| r.as_vector().to_vec()).collect();
        let (x_train, x_test) = x.split_at(n_train);
        let (y_train, y_test) = set.labels.split_at(n_train);

        let params = ForestParams {
            n_trees: self.config.trees,
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            max_features: None,
            seed: self.config.seed,
        };
        let forest = RandomForest::fit(x_train, y_train, &params)?;

        let correct = x_test
            .iter()
            .zip(y_test)
            .filter(|(row, label)| forest.predict(row) == **label)
            .count();
        let accuracy = correct as f64 / n_test as f64 * 100.0;
        info!(
            "Model accuracy: {:.2}% ({} train / {} holdout rows)",
            accuracy, n_train, n_test
        );
        debug!(
            "Forest: {} trees over {} features, max depth {}",
            forest.n_trees(),
            forest.n_features(),
            forest.max_depth()
        );

        Ok(TrainedModel {
            forest,
            train_rows: n_train,
        })
    }

    /// Train and classify the most recent row.
    pub fn train_and_predict(&self, set: &FeatureSet) -> Result<Direction> {
        let model = self.train(set)?;
        Ok(model.predict(&set.latest))
    }
}
