//! Testing utilities for the datavis workspace
//!
//! [`MemoryDatasetApi`] follows the host REST contract in memory: per-post
//! collections, derived `url` and `rows`, 404s for unknown posts and files.
//! It counts calls per operation and can inject latency or failures.

#![allow(missing_docs)]

use async_trait::async_trait;
use datavis_client::DatasetApi;
use datavis_dataset::{
    Dataset, DatasetDraft, DatasetError, DatasetResult, DatasetSummary, Filename, PostId,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const SALES_CSV: &str = "month,total\nJan,100\nFeb,150\n";
pub const DEFAULT_BASE: &str = "http://datavis.test/wp-json/wp/v2/posts";

/// Number of calls each operation received
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list + self.get + self.create + self.update + self.delete
    }
}

#[derive(Debug, Default)]
struct Counters {
    list: AtomicUsize,
    get: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

/// In-memory dataset backend
#[derive(Debug)]
pub struct MemoryDatasetApi {
    base_url: String,
    posts: Mutex<HashMap<PostId, BTreeMap<Filename, String>>>,
    counters: Counters,
    latency: Duration,
    delays: Mutex<VecDeque<Duration>>,
    failures: Mutex<VecDeque<DatasetError>>,
}

impl MemoryDatasetApi {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE.to_string(),
            posts: Mutex::new(HashMap::new()),
            counters: Counters::default(),
            latency: Duration::ZERO,
            delays: Mutex::new(VecDeque::new()),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Register a post with an empty dataset collection
    pub fn with_post(self, post: PostId) -> Self {
        self.posts.lock().entry(post).or_default();
        self
    }

    /// Delay every response by `latency` unless a queued delay applies
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Store a dataset directly, bypassing counters
    pub fn seed(&self, post: PostId, filename: &str, content: &str) {
        let filename = Filename::new(filename).unwrap();
        self.posts
            .lock()
            .entry(post)
            .or_default()
            .insert(filename, content.to_string());
    }

    /// Remove a dataset directly, bypassing counters
    pub fn remove(&self, post: PostId, filename: &str) -> bool {
        let Ok(filename) = Filename::new(filename) else {
            return false;
        };
        self.posts
            .lock()
            .get_mut(&post)
            .is_some_and(|collection| collection.remove(&filename).is_some())
    }

    /// Delay the next response by `delay` (consumed in call order)
    pub fn push_delay(&self, delay: Duration) {
        self.delays.lock().push_back(delay);
    }

    /// Fail the next call with `error` (consumed in call order)
    pub fn fail_next(&self, error: DatasetError) {
        self.failures.lock().push_back(error);
    }

    /// Snapshot of call counters
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            list: self.counters.list.load(Ordering::SeqCst),
            get: self.counters.get.load(Ordering::SeqCst),
            create: self.counters.create.load(Ordering::SeqCst),
            update: self.counters.update.load(Ordering::SeqCst),
            delete: self.counters.delete.load(Ordering::SeqCst),
        }
    }

    /// Content currently held for a dataset
    pub fn stored(&self, post: PostId, filename: &str) -> Option<String> {
        let filename = Filename::new(filename).ok()?;
        self.posts.lock().get(&post)?.get(&filename).cloned()
    }

    pub fn url_for(&self, post: PostId, filename: &Filename) -> String {
        format!("{}/{}/datasets/{}", self.base_url, post, filename)
    }

    fn record(&self, counter: &AtomicUsize) -> DatasetResult<Duration> {
        counter.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().pop_front().unwrap_or(self.latency);
        match self.failures.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(delay),
        }
    }

    fn write(&self, post: PostId, draft: &DatasetDraft) -> DatasetResult<Dataset> {
        let mut posts = self.posts.lock();
        let collection = posts
            .get_mut(&post)
            .ok_or_else(|| DatasetError::post_not_found(post))?;
        collection.insert(draft.filename.clone(), draft.content.clone());
        Ok(Dataset::new(
            draft.filename.clone(),
            draft.content.clone(),
            self.url_for(post, &draft.filename),
        ))
    }
}

impl Default for MemoryDatasetApi {
    fn default() -> Self {
        Self::new()
    }
}

async fn respond_after<T>(delay: Duration, result: DatasetResult<T>) -> DatasetResult<T> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    result
}

#[async_trait]
impl DatasetApi for MemoryDatasetApi {
    async fn list(&self, post: PostId) -> DatasetResult<Vec<DatasetSummary>> {
        let delay = self.record(&self.counters.list)?;
        let result = {
            let posts = self.posts.lock();
            posts
                .get(&post)
                .map(|collection| {
                    collection
                        .iter()
                        .map(|(filename, content)| {
                            Dataset::new(
                                filename.clone(),
                                content.clone(),
                                self.url_for(post, filename),
                            )
                            .summary()
                        })
                        .collect()
                })
                .ok_or_else(|| DatasetError::post_not_found(post))
        };
        respond_after(delay, result).await
    }

    async fn get(&self, post: PostId, filename: &Filename) -> DatasetResult<Dataset> {
        let delay = self.record(&self.counters.get)?;
        let result = {
            let posts = self.posts.lock();
            match posts.get(&post) {
                None => Err(DatasetError::post_not_found(post)),
                Some(collection) => collection
                    .get(filename)
                    .map(|content| {
                        Dataset::new(
                            filename.clone(),
                            content.clone(),
                            self.url_for(post, filename),
                        )
                    })
                    .ok_or_else(|| DatasetError::dataset_not_found(filename)),
            }
        };
        respond_after(delay, result).await
    }

    async fn create(&self, post: PostId, draft: &DatasetDraft) -> DatasetResult<Dataset> {
        let delay = self.record(&self.counters.create)?;
        let result = self.write(post, draft);
        respond_after(delay, result).await
    }

    async fn update(&self, post: PostId, draft: &DatasetDraft) -> DatasetResult<Dataset> {
        let delay = self.record(&self.counters.update)?;
        let result = self.write(post, draft);
        respond_after(delay, result).await
    }

    async fn delete(&self, post: PostId, filename: &Filename) -> DatasetResult<bool> {
        let delay = self.record(&self.counters.delete)?;
        let result = {
            let mut posts = self.posts.lock();
            posts
                .get_mut(&post)
                .map(|collection| collection.remove(filename).is_some())
                .ok_or_else(|| DatasetError::post_not_found(post))
        };
        respond_after(delay, result).await
    }
}

pub fn post(id: u64) -> PostId {
    PostId::new(id).unwrap()
}

pub fn filename(name: &str) -> Filename {
    Filename::new(name).unwrap()
}

pub fn draft(name: &str, content: &str) -> DatasetDraft {
    DatasetDraft::new(name, content).unwrap()
}

/// Backend with post 42 registered, shared for store and throttle tests
pub fn memory_api() -> Arc<MemoryDatasetApi> {
    Arc::new(MemoryDatasetApi::new().with_post(post(42)))
}

/// Bar chart over the sales fixture columns
pub fn bar_spec() -> Value {
    json!({
        "title": "Sales",
        "mark": {"type": "bar", "tooltip": true},
        "encoding": {
            "x": {"field": "month", "type": "nominal"},
            "y": {"field": "total", "type": "quantitative"},
            "color": {"field": "month", "type": "nominal"}
        },
        "data": {"values": [{"month": "Jan", "total": 100}, {"month": "Feb", "total": 150}]}
    })
}

/// Pie chart over the sales fixture columns
pub fn arc_spec() -> Value {
    json!({
        "mark": "arc",
        "encoding": {
            "theta": {"field": "total", "type": "quantitative"},
            "color": {"field": "month", "type": "nominal"}
        },
        "data": {"url": format!("{DEFAULT_BASE}/42/datasets/sales.csv")}
    })
}
