//! Yahoo Finance API client for historical stock data.
//!
//! Provides daily OHLCV bars for equities, including exchange-suffixed
//! symbols such as `RELIANCE.NS`.

use super::MarketDataSource;
use crate::error::{AppError, Result};
use crate::types::{normalize_series, PriceBar};
use chrono::{NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

impl YahooError {
    /// Yahoo reports an empty range or unknown symbol as an error object.
    fn is_no_data(&self) -> bool {
        self.code.eq_ignore_ascii_case("Not Found")
            || self.description.to_lowercase().contains("no data")
    }
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    symbol: String,
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Normalize symbol for Yahoo Finance API.
///
/// Share classes use a hyphen (`BRK.B` -> `BRK-B`); exchange suffixes
/// (`RELIANCE.NS`, `VOD.L`) are passed through.
fn normalize_yahoo_symbol(symbol: &str) -> String {
    let upper = symbol.trim().to_uppercase();
    match upper.rsplit_once('.') {
        Some((base, class @ ("A" | "B" | "C"))) => format!("{}-{}", base, class),
        _ => upper,
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Convert a chart result into bars, skipping rows without a close.
fn bars_from_result(result: YahooResult) -> Vec<PriceBar> {
    let Some(timestamps) = result.timestamp else {
        return Vec::new();
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Vec::new();
    };

    let offset = result.meta.gmtoffset.unwrap_or(0);
    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let Some(close) = closes.get(i).and_then(|v| *v) else {
            continue;
        };
        let Some(date) = chrono::DateTime::from_timestamp(timestamp + offset, 0)
            .map(|dt| dt.date_naive())
        else {
            continue;
        };

        bars.push(PriceBar {
            date,
            open: opens.get(i).and_then(|v| *v).unwrap_or(close),
            high: highs.get(i).and_then(|v| *v).unwrap_or(close),
            low: lows.get(i).and_then(|v| *v).unwrap_or(close),
            close,
            volume: volumes.get(i).and_then(|v| *v).unwrap_or(0) as f64,
        });
    }

    normalize_series(bars)
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self { client })
    }

    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval=1d&includePrePost=false&events=div%2Csplit",
            BASE_URL,
            normalize_yahoo_symbol(symbol),
            unix_midnight(start),
            unix_midnight(end)
        )
    }

    /// Fetch daily bars for a symbol in `[start, end)`.
    pub async fn get_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        if end <= start {
            return Ok(Vec::new());
        }

        let url = Self::chart_url(symbol, start, end);
        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        let body = response.text().await?;

        // Unknown symbols come back as 404 with a regular error body.
        let data: YahooChartResponse = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(e) if !status.is_success() => {
                return Err(AppError::ExternalApi(format!("API error: {} ({})", status, e)))
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = data.chart.error {
            if error.is_no_data() {
                debug!("Yahoo has no data for {}: {}", symbol, error.description);
                return Ok(Vec::new());
            }
            return Err(AppError::ExternalApi(format!(
                "Yahoo API error: {} - {}",
                error.code, error.description
            )));
        }

        let Some(result) = data.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };

        debug!("Yahoo returned series for {}", result.meta.symbol);
        Ok(bars_from_result(result))
    }
}

impl MarketDataSource for YahooFinanceClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        self.get_daily_bars(ticker, start, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // normalize_yahoo_symbol Tests
    // =========================================================================

    #[test]
    fn test_normalize_yahoo_symbol_uppercase() {
        assert_eq!(normalize_yahoo_symbol("aapl"), "AAPL");
        assert_eq!(normalize_yahoo_symbol(" msft "), "MSFT");
    }

    #[test]
    fn test_normalize_yahoo_symbol_share_class() {
        assert_eq!(normalize_yahoo_symbol("BRK.B"), "BRK-B");
        assert_eq!(normalize_yahoo_symbol("brk.a"), "BRK-A");
    }

    #[test]
    fn test_normalize_yahoo_symbol_exchange_suffix() {
        assert_eq!(normalize_yahoo_symbol("reliance.ns"), "RELIANCE.NS");
        assert_eq!(normalize_yahoo_symbol("HDFCBANK.NS"), "HDFCBANK.NS");
        assert_eq!(normalize_yahoo_symbol("VOD.L"), "VOD.L");
    }

    #[test]
    fn test_chart_url_range() {
        let url = YahooFinanceClient::chart_url(
            "tcs.ns",
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
        );
        assert!(url.contains("/TCS.NS?"));
        assert!(url.contains("period1=1672531200"));
        assert!(url.contains("period2=1672617600"));
        assert!(url.contains("interval=1d"));
    }

    // =========================================================================
    // Response parsing Tests
    // =========================================================================

    #[test]
    fn test_yahoo_error_no_data() {
        let json = r#"{
            "code": "Not Found",
            "description": "No data found, symbol may be delisted"
        }"#;
        let error: YahooError = serde_json::from_str(json).unwrap();
        assert!(error.is_no_data());

        let other = YahooError {
            code: "Bad Request".to_string(),
            description: "Invalid interval".to_string(),
        };
        assert!(!other.is_no_data());
    }

    #[test]
    fn test_bars_from_result_with_nulls() {
        let json = r#"{
            "meta": {"symbol": "INFY.NS", "gmtoffset": 19800},
            "timestamp": [1704166200, 1704252600, 1704339000],
            "indicators": {"quote": [{
                "open": [1500.0, null, 1510.0],
                "high": [1520.0, null, 1530.0],
                "low": [1490.0, null, 1505.0],
                "close": [1510.0, null, 1525.5],
                "volume": [1000, null, 1200]
            }]}
        }"#;
        let result: YahooResult = serde_json::from_str(json).unwrap();
        let bars = bars_from_result(result);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(bars[1].close, 1525.5);
        assert_eq!(bars[1].volume, 1200.0);
    }

    #[test]
    fn test_bars_from_result_without_timestamps() {
        let json = r#"{
            "meta": {"symbol": "AAPL"},
            "indicators": {"quote": [{}]}
        }"#;
        let result: YahooResult = serde_json::from_str(json).unwrap();
        assert!(bars_from_result(result).is_empty());
    }

    #[test]
    fn test_chart_with_error() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data"}
            }
        }"#;
        let response: YahooChartResponse = serde_json::from_str(json).unwrap();
        assert!(response.chart.result.is_none());
        assert!(response.chart.error.unwrap().is_no_data());
    }

    #[test]
    fn test_malformed_body_is_a_json_error() {
        let err: AppError = serde_json::from_str::<YahooChartResponse>("<html>rate limited</html>")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::SerdeJson(_)));
    }

    #[test]
    fn test_yahoo_finance_client_creation() {
        let client = YahooFinanceClient::new(Duration::from_secs(5));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().name(), "yahoo");
    }

    #[tokio::test]
    async fn test_empty_range_short_circuits() {
        let client = YahooFinanceClient::new(Duration::from_secs(5)).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = client.get_daily_bars("AAPL", day, day).await.unwrap();
        assert!(bars.is_empty());
    }
}
