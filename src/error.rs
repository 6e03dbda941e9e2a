use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Insufficient data: need {needed} rows, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether the error means "not enough data yet" rather than a fault.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, AppError::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
