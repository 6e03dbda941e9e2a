use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;

/// Tickers offered when `AUTOTRADE_TICKERS` is not set.
pub const DEFAULT_TICKERS: [&str; 5] = ["RELIANCE.NS", "TCS.NS", "INFY.NS", "ITC.NS", "HDFCBANK.NS"];

/// Classifier settings.
#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub trees: usize,
    /// Seed for bootstrap and feature sampling.
    pub seed: u64,
    /// Share of the most recent rows held out for accuracy reporting.
    pub test_fraction: f64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            trees: 100,
            seed: 42,
            test_fraction: 0.2,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tickers available in the selector.
    pub tickers: Vec<String>,
    /// Initial start of the date range.
    pub start_date: NaiveDate,
    /// Initial end of the date range (exclusive).
    pub end_date: NaiveDate,
    /// Directory holding the trade ledger and prediction log.
    pub log_dir: PathBuf,
    /// Minimum number of bars before a prediction is attempted.
    pub min_training_rows: usize,
    /// Classifier settings.
    pub forest: ForestConfig,
    /// Time-to-live for fetched price series (seconds).
    pub series_cache_ttl_secs: u64,
    /// HTTP request timeout for the market data provider (seconds).
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        // Format: "AAPL,MSFT,RELIANCE.NS"
        let tickers = env::var("AUTOTRADE_TICKERS")
            .ok()
            .map(|s| parse_tickers(&s))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect());

        let today = chrono::Local::now().date_naive();
        let start_date = env::var("AUTOTRADE_START_DATE")
            .ok()
            .and_then(|v| parse_date(&v))
            .unwrap_or_else(default_start_date);
        let end_date = env::var("AUTOTRADE_END_DATE")
            .ok()
            .and_then(|v| parse_date(&v))
            .unwrap_or(today);

        let defaults = ForestConfig::default();

        Self {
            tickers,
            start_date,
            end_date,
            log_dir: env::var("AUTOTRADE_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("logs")),
            min_training_rows: env::var("MIN_TRAINING_ROWS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            forest: ForestConfig {
                trees: env::var("FOREST_TREES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|t| *t > 0)
                    .unwrap_or(defaults.trees),
                seed: env::var("FOREST_SEED")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.seed),
                test_fraction: env::var("TEST_FRACTION")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|f: &f64| *f > 0.0 && *f < 1.0)
                    .unwrap_or(defaults.test_fraction),
            },
            series_cache_ttl_secs: env::var("SERIES_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Path of the simulated trade ledger.
    pub fn trade_log_path(&self) -> PathBuf {
        self.log_dir.join("fake_trades.csv")
    }

    /// Path of the prediction log.
    pub fn prediction_log_path(&self) -> PathBuf {
        self.log_dir.join("trade_log.csv")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn parse_tickers(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forest_config_default() {
        let forest = ForestConfig::default();
        assert_eq!(forest.trees, 100);
        assert_eq!(forest.seed, 42);
        assert_eq!(forest.test_fraction, 0.2);
    }

    #[test]
    fn test_parse_tickers() {
        assert_eq!(
            parse_tickers("aapl, msft ,,reliance.ns"),
            vec!["AAPL", "MSFT", "RELIANCE.NS"]
        );
        assert!(parse_tickers(" , ").is_empty());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2023-01-01"),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        assert_eq!(parse_date(" 2024-02-29 "), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_date("01/02/2023"), None);
    }

    #[test]
    fn test_default_start_date() {
        assert_eq!(default_start_date().to_string(), "2023-01-01");
    }

    #[test]
    fn test_log_paths() {
        let mut config = Config::from_env();
        config.log_dir = PathBuf::from("some_dir");
        assert_eq!(config.trade_log_path(), PathBuf::from("some_dir/fake_trades.csv"));
        assert_eq!(config.prediction_log_path(), PathBuf::from("some_dir/trade_log.csv"));
    }
}
