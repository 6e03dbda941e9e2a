//! Market data providers.

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use crate::types::PriceBar;
use chrono::NaiveDate;
use std::future::Future;

/// A provider of daily OHLCV history.
pub trait MarketDataSource {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Fetch daily bars for `ticker` in `[start, end)`.
    ///
    /// An empty vector means the provider has no rows for the range.
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<PriceBar>>> + Send;
}
