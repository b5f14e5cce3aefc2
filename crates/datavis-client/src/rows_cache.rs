//! Parsed CSV rows keyed by dataset URL, using moka
//!
//! Charts re-render often and each render needs the rows behind `data.url`.
//! Entries expire after a TTL; writes should invalidate their URL.

use datavis_dataset::{csv, DatasetError, DatasetResult, Row};
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// TTL cache of parsed rows
#[derive(Debug, Clone)]
pub struct CsvRowsCache {
    inner: Cache<String, Arc<Vec<Row>>>,
}

impl CsvRowsCache {
    /// Create cache with capacity and time-based expiration
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Return cached rows for `url`, or fetch and parse the CSV text
    ///
    /// Concurrent misses for one URL share a single fetch. Failed fetches are
    /// not cached.
    ///
    /// # Errors
    /// Whatever `fetch` fails with
    pub async fn get_or_fetch<F, Fut>(&self, url: &str, fetch: F) -> DatasetResult<Arc<Vec<Row>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DatasetResult<String>>,
    {
        self.inner
            .try_get_with(url.to_string(), async move {
                let text = fetch().await?;
                Ok::<_, DatasetError>(Arc::new(csv::parse(&text)))
            })
            .await
            .map_err(|err: Arc<DatasetError>| (*err).clone())
    }

    /// Drop cached rows for `url`
    #[inline]
    pub async fn invalidate(&self, url: &str) {
        self.inner.invalidate(url).await;
    }

    /// Check if rows for `url` are cached
    #[inline]
    #[must_use]
    pub async fn contains(&self, url: &str) -> bool {
        self.inner.get(url).await.is_some()
    }
}

impl Default for CsvRowsCache {
    /// Create cache with default capacity (256 entries) and a one-minute TTL
    fn default() -> Self {
        Self::new(256, Duration::from_secs(60))
    }
}
