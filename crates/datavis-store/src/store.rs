//! Dataset store
//!
//! Session cache of one document's datasets, keyed by filename. Reads are
//! synchronous and never touch the network; actions go through the
//! [`DatasetApi`] and merge only server-confirmed results.
//!
//! # Response ordering
//!
//! Every action takes a ticket from a monotonically increasing sequence when
//! it is issued. A resolved response is merged only if no response with a
//! newer ticket has been merged for the same filename. Deletions leave a
//! tombstone carrying their ticket, so a slow create issued before a delete
//! cannot resurrect the entry. The last *issued* action wins regardless of
//! resolution order; stale responses are still returned to their caller.

use crate::event::StoreEvent;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use datavis_client::DatasetApi;
use datavis_dataset::{Dataset, DatasetDraft, DatasetResult, DatasetSummary, Filename, PostId};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the oldest are dropped
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct Record {
    summary: DatasetSummary,
    content: Option<String>,
}

impl Record {
    fn full(dataset: Dataset) -> Self {
        Self {
            summary: dataset.summary(),
            content: Some(dataset.content),
        }
    }

    fn to_dataset(&self) -> Option<Dataset> {
        let content = self.content.clone()?;
        Some(Dataset {
            filename: self.summary.filename.clone(),
            content,
            url: self.summary.url.clone(),
            rows: self.summary.rows,
        })
    }
}

/// Cache slot; `record == None` is a tombstone
#[derive(Debug)]
struct Slot {
    ticket: u64,
    record: Option<Record>,
}

#[derive(Debug)]
struct StoreInner {
    post: PostId,
    api: Arc<dyn DatasetApi>,
    records: DashMap<Filename, Slot>,
    sequence: AtomicU64,
    loaded: AtomicBool,
    refreshing: AtomicBool,
    events: broadcast::Sender<StoreEvent>,
}

/// Cache of a document's datasets
///
/// Cheap to clone; clones share the cache.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    inner: Arc<StoreInner>,
}

impl DatasetStore {
    /// Create an empty store for one document
    #[must_use]
    pub fn new(post: PostId, api: Arc<dyn DatasetApi>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                post,
                api,
                records: DashMap::new(),
                sequence: AtomicU64::new(0),
                loaded: AtomicBool::new(false),
                refreshing: AtomicBool::new(false),
                events,
            }),
        }
    }

    /// Document this store belongs to
    #[inline]
    #[must_use]
    pub fn post(&self) -> PostId {
        self.inner.post
    }

    /// Receive change notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// Full record of a dataset, if its content is cached
    ///
    /// Entries known only from a list response carry no content; use
    /// [`Self::load_dataset`] to fetch it.
    #[must_use]
    pub fn get_dataset(&self, filename: &Filename) -> Option<Dataset> {
        self.inner
            .records
            .get(filename)
            .and_then(|slot| slot.record.as_ref().and_then(Record::to_dataset))
    }

    /// Cached summary of a dataset
    #[must_use]
    pub fn summary(&self, filename: &Filename) -> Option<DatasetSummary> {
        self.inner
            .records
            .get(filename)
            .and_then(|slot| slot.record.as_ref().map(|r| r.summary.clone()))
    }

    /// Cached summaries, sorted by filename
    ///
    /// When nothing has been loaded yet, a background refresh is started on
    /// the current Tokio runtime and this call returns the (empty) cache.
    #[must_use]
    pub fn get_datasets(&self) -> Vec<DatasetSummary> {
        let mut summaries: Vec<DatasetSummary> = self
            .inner
            .records
            .iter()
            .filter_map(|slot| slot.record.as_ref().map(|r| r.summary.clone()))
            .collect();
        summaries.sort_by(|a, b| a.filename.cmp(&b.filename));

        if summaries.is_empty() && !self.inner.loaded.load(Ordering::Acquire) {
            self.refresh_in_background();
        }
        summaries
    }

    /// Number of cached datasets
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .records
            .iter()
            .filter(|slot| slot.record.is_some())
            .count()
    }

    /// Whether no dataset is cached
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reload the dataset list from the API
    ///
    /// Content is kept for entries whose summary is unchanged; entries the
    /// server no longer lists are dropped.
    ///
    /// # Errors
    /// Any [`datavis_dataset::DatasetError`] from the API; the cache is unchanged
    pub async fn refresh(&self) -> DatasetResult<Vec<DatasetSummary>> {
        let ticket = self.next_ticket();
        let summaries = self.inner.api.list(self.inner.post).await?;
        self.merge_listing(ticket, &summaries);
        self.inner.loaded.store(true, Ordering::Release);
        tracing::debug!("Refreshed {} datasets for post {}", summaries.len(), self.inner.post);
        self.emit(StoreEvent::Refreshed);
        Ok(summaries)
    }

    /// Fetch one full record and cache it
    ///
    /// # Errors
    /// Any [`datavis_dataset::DatasetError`] from the API; the cache is unchanged
    pub async fn load_dataset(&self, filename: &Filename) -> DatasetResult<Dataset> {
        let ticket = self.next_ticket();
        let dataset = self.inner.api.get(self.inner.post, filename).await?;
        self.merge_dataset(ticket, &dataset);
        Ok(dataset)
    }

    /// Create a dataset and cache the server's record
    ///
    /// # Errors
    /// Any [`datavis_dataset::DatasetError`] from the API; the cache is unchanged
    pub async fn create_dataset(&self, draft: &DatasetDraft) -> DatasetResult<Dataset> {
        let ticket = self.next_ticket();
        tracing::info!("Creating dataset {} (ticket {})", draft.filename, ticket);
        let dataset = self.inner.api.create(self.inner.post, draft).await?;
        self.merge_dataset(ticket, &dataset);
        Ok(dataset)
    }

    /// Overwrite a dataset and cache the server's record
    ///
    /// # Errors
    /// Any [`datavis_dataset::DatasetError`] from the API; the cache is unchanged
    pub async fn update_dataset(&self, draft: &DatasetDraft) -> DatasetResult<Dataset> {
        let ticket = self.next_ticket();
        tracing::info!("Updating dataset {} (ticket {})", draft.filename, ticket);
        let dataset = self.inner.api.update(self.inner.post, draft).await?;
        self.merge_dataset(ticket, &dataset);
        Ok(dataset)
    }

    /// Delete a dataset and drop it from the cache
    ///
    /// # Errors
    /// Any [`datavis_dataset::DatasetError`] from the API; the cache is unchanged
    pub async fn delete_dataset(&self, filename: &Filename) -> DatasetResult<bool> {
        let ticket = self.next_ticket();
        tracing::info!("Deleting dataset {} (ticket {})", filename, ticket);
        let deleted = self.inner.api.delete(self.inner.post, filename).await?;

        if let Some(Some(_)) = self.apply(filename, ticket, None) {
            self.emit(StoreEvent::Removed(filename.clone()));
        }
        Ok(deleted)
    }

    fn next_ticket(&self) -> u64 {
        self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is not an error
        let _ = self.inner.events.send(event);
    }

    fn merge_dataset(&self, ticket: u64, dataset: &Dataset) {
        let record = Record::full(dataset.clone());
        if self.apply(&dataset.filename, ticket, Some(record)).is_some() {
            self.emit(StoreEvent::Upserted(dataset.filename.clone()));
        }
    }

    /// Store `record` under `filename` unless a newer ticket was merged
    ///
    /// Returns the replaced record (`Some(None)` for a tombstone or an empty
    /// slot), or `None` when the response was stale.
    fn apply(
        &self,
        filename: &Filename,
        ticket: u64,
        record: Option<Record>,
    ) -> Option<Option<Record>> {
        match self.inner.records.entry(filename.clone()) {
            Entry::Occupied(mut slot) => {
                let current = slot.get().ticket;
                if current > ticket {
                    tracing::debug!(
                        "Dropping stale response for {} (ticket {} < {})",
                        filename,
                        ticket,
                        current
                    );
                    return None;
                }
                let previous = slot.insert(Slot { ticket, record });
                Some(previous.record)
            }
            Entry::Vacant(slot) => {
                slot.insert(Slot { ticket, record });
                Some(None)
            }
        }
    }

    fn merge_listing(&self, ticket: u64, summaries: &[DatasetSummary]) {
        let listed: HashSet<&Filename> = summaries.iter().map(|s| &s.filename).collect();

        for summary in summaries {
            match self.inner.records.entry(summary.filename.clone()) {
                Entry::Occupied(mut slot) => {
                    let current = slot.get_mut();
                    if current.ticket > ticket {
                        continue;
                    }
                    let content = current
                        .record
                        .as_ref()
                        .filter(|record| record.summary == *summary)
                        .and_then(|record| record.content.clone());
                    *current = Slot {
                        ticket,
                        record: Some(Record {
                            summary: summary.clone(),
                            content,
                        }),
                    };
                }
                Entry::Vacant(slot) => {
                    slot.insert(Slot {
                        ticket,
                        record: Some(Record {
                            summary: summary.clone(),
                            content: None,
                        }),
                    });
                }
            }
        }

        for mut slot in self.inner.records.iter_mut() {
            if slot.ticket < ticket && slot.record.is_some() && !listed.contains(slot.key()) {
                slot.ticket = ticket;
                slot.record = None;
            }
        }
    }

    fn refresh_in_background(&self) {
        if self
            .inner
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime available for background dataset refresh");
            self.inner.refreshing.store(false, Ordering::Release);
            return;
        };

        let store = self.clone();
        handle.spawn(async move {
            if let Err(e) = store.refresh().await {
                tracing::warn!("Background dataset refresh failed: {}", e);
            }
            store.inner.refreshing.store(false, Ordering::Release);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datavis_dataset::DatasetError;

    /// Backend that fails every call, for cache-only behaviour
    struct Offline;

    #[async_trait::async_trait]
    impl DatasetApi for Offline {
        async fn list(&self, _post: PostId) -> DatasetResult<Vec<DatasetSummary>> {
            Err(DatasetError::NetworkFailure("offline".into()))
        }
        async fn get(&self, _post: PostId, _filename: &Filename) -> DatasetResult<Dataset> {
            Err(DatasetError::NetworkFailure("offline".into()))
        }
        async fn create(&self, _post: PostId, _draft: &DatasetDraft) -> DatasetResult<Dataset> {
            Err(DatasetError::NetworkFailure("offline".into()))
        }
        async fn update(&self, _post: PostId, _draft: &DatasetDraft) -> DatasetResult<Dataset> {
            Err(DatasetError::NetworkFailure("offline".into()))
        }
        async fn delete(&self, _post: PostId, _filename: &Filename) -> DatasetResult<bool> {
            Err(DatasetError::NetworkFailure("offline".into()))
        }
    }

    fn store() -> DatasetStore {
        DatasetStore::new(PostId::new(1).unwrap(), Arc::new(Offline))
    }

    fn dataset(name: &str, content: &str) -> Dataset {
        Dataset::new(Filename::new(name).unwrap(), content, format!("/d/{name}"))
    }

    #[test]
    fn store_apply_rejects_older_ticket() {
        let store = store();
        let name = Filename::new("a.csv").unwrap();

        assert!(store.apply(&name, 2, Some(Record::full(dataset("a.csv", "x\n2")))).is_some());
        assert!(store.apply(&name, 1, Some(Record::full(dataset("a.csv", "x\n1")))).is_none());
        assert_eq!(store.get_dataset(&name).unwrap().content, "x\n2");
    }

    #[test]
    fn store_tombstone_blocks_older_upsert() {
        let store = store();
        let name = Filename::new("a.csv").unwrap();

        store.apply(&name, 3, None);
        assert!(store.apply(&name, 2, Some(Record::full(dataset("a.csv", "x\n1")))).is_none());
        assert!(store.get_dataset(&name).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn store_listing_keeps_matching_content() {
        let store = store();
        let kept = dataset("a.csv", "x\n1");
        let changed = dataset("b.csv", "x\n1");
        store.merge_dataset(1, &kept);
        store.merge_dataset(2, &changed);
        store.merge_dataset(3, &dataset("gone.csv", "x\n1"));

        let mut listed_b = changed.summary();
        listed_b.rows = 5;
        store.merge_listing(4, &[kept.summary(), listed_b]);

        assert_eq!(store.get_dataset(&kept.filename), Some(kept));
        assert!(store.get_dataset(&changed.filename).is_none());
        assert_eq!(store.summary(&changed.filename).unwrap().rows, 5);
        assert!(store.summary(&Filename::new("gone.csv").unwrap()).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn store_get_datasets_without_runtime_is_cache_only() {
        let store = store();
        assert!(store.get_datasets().is_empty());
        assert!(!store.inner.refreshing.load(Ordering::Acquire));
    }
}
