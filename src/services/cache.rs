//! TTL caches in front of the fetcher and the model fit.

use crate::services::predictor::TrainedModel;
use crate::types::{PriceBar, Selection};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A thread-safe cache with TTL support.
pub struct Cache<K, V> {
    data: DashMap<K, CacheEntry<V>>,
    default_ttl: Duration,
}

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<K: Eq + Hash + Clone, V: Clone> Cache<K, V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            data: DashMap::new(),
            default_ttl,
        }
    }

    /// Get a live value; expired entries are evicted on read.
    pub fn get(&self, key: &K) -> Option<V> {
        let entry = self.data.get(key)?;
        if entry.expires_at > Instant::now() {
            Some(entry.value.clone())
        } else {
            drop(entry);
            self.data.remove(key);
            None
        }
    }

    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.data.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.data.remove(key).map(|(_, entry)| entry.value)
    }

    /// Drop every entry whose key matches `pred`.
    pub fn remove_where(&self, pred: impl Fn(&K) -> bool) {
        self.data.retain(|k, _| !pred(k));
    }

    pub fn clear(&self) {
        self.data.clear();
    }

    /// Remove all expired entries.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.data.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Cache key for one `(ticker, start, end)` selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl From<&Selection> for SeriesKey {
    fn from(sel: &Selection) -> Self {
        Self {
            ticker: sel.ticker.clone(),
            start: sel.start,
            end: sel.end,
        }
    }
}

/// Identifies the data a model was fitted on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataVersion {
    pub bars: usize,
    pub last_date: Option<NaiveDate>,
    /// Last close as raw bits so the key stays `Eq + Hash`.
    pub last_close_bits: u64,
}

impl DataVersion {
    pub fn of(bars: &[PriceBar]) -> Self {
        let last = bars.last();
        Self {
            bars: bars.len(),
            last_date: last.map(|b| b.date),
            last_close_bits: last.map(|b| b.close.to_bits()).unwrap_or(0),
        }
    }
}

/// Fetched series by selection.
pub struct SeriesCache {
    inner: Cache<SeriesKey, Arc<Vec<PriceBar>>>,
}

impl SeriesCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::new(ttl),
        }
    }

    pub fn get(&self, sel: &Selection) -> Option<Arc<Vec<PriceBar>>> {
        self.inner.get(&SeriesKey::from(sel))
    }

    pub fn insert(&self, sel: &Selection, bars: Arc<Vec<PriceBar>>) {
        self.inner.set(SeriesKey::from(sel), bars);
    }

    pub fn invalidate(&self, sel: &Selection) {
        self.inner.remove(&SeriesKey::from(sel));
    }

    /// Evict expired series.
    pub fn cleanup(&self) {
        self.inner.cleanup();
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Fitted models by selection and data version.
///
/// Models never expire on their own. At most one version is kept per
/// selection: storing a model replaces any older fit.
pub struct ModelCache {
    inner: Cache<(SeriesKey, DataVersion), Arc<TrainedModel>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            inner: Cache::new(Duration::from_secs(u32::MAX as u64)),
        }
    }

    pub fn get(&self, sel: &Selection, version: &DataVersion) -> Option<Arc<TrainedModel>> {
        self.inner.get(&(SeriesKey::from(sel), version.clone()))
    }

    pub fn insert(&self, sel: &Selection, version: DataVersion, model: Arc<TrainedModel>) {
        let key = SeriesKey::from(sel);
        self.inner.remove_where(|(k, _)| *k == key);
        self.inner.set((key, version), model);
    }

    /// Drop every model fitted for this selection, whatever its version.
    pub fn invalidate(&self, sel: &Selection) {
        let key = SeriesKey::from(sel);
        self.inner.remove_where(|(k, _)| *k == key);
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}
