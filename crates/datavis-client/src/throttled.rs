//! Throttled variant of every dataset operation
//!
//! Rapid UI interactions (keystroke-driven saves, repeated selector reads)
//! issue the same request many times. Each operation gets its own
//! [`Coalescer`] keyed by the full call arguments, so identical calls made
//! while a request is in flight share one round-trip while differing calls
//! never do.
//!
//! Starting a write detaches every pending request of the other operations
//! that touches the same filename (and the document's listing), so calls
//! issued after the write never receive a response from before it.

use crate::api::DatasetApi;
use crate::throttle::{Coalescer, CoalescerStats};
use datavis_dataset::{
    Dataset, DatasetDraft, DatasetError, DatasetResult, DatasetSummary, Filename, PostId,
};
use std::sync::Arc;
use std::time::Duration;

/// Default coalescing window
pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_millis(200);

/// Per-operation coalescing statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThrottleStats {
    /// `list` calls
    pub list: CoalescerStats,
    /// `get` calls
    pub get: CoalescerStats,
    /// `create` calls
    pub create: CoalescerStats,
    /// `update` calls
    pub update: CoalescerStats,
    /// `delete` calls
    pub delete: CoalescerStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Update,
    Delete,
}

/// Dataset API wrapper that coalesces identical calls
#[derive(Debug)]
pub struct ThrottledDatasetApi {
    inner: Arc<dyn DatasetApi>,
    list: Coalescer<PostId, Vec<DatasetSummary>, DatasetError>,
    get: Coalescer<(PostId, Filename), Dataset, DatasetError>,
    create: Coalescer<(PostId, DatasetDraft), Dataset, DatasetError>,
    update: Coalescer<(PostId, DatasetDraft), Dataset, DatasetError>,
    delete: Coalescer<(PostId, Filename), bool, DatasetError>,
}

impl ThrottledDatasetApi {
    /// Wrap an API with a coalescing window
    #[must_use]
    pub fn new(inner: Arc<dyn DatasetApi>, window: Duration) -> Self {
        Self {
            inner,
            list: Coalescer::new(window),
            get: Coalescer::new(window),
            create: Coalescer::new(window),
            update: Coalescer::new(window),
            delete: Coalescer::new(window),
        }
    }

    /// Wrap an API with the default 200 ms window
    #[inline]
    #[must_use]
    pub fn with_default_window(inner: Arc<dyn DatasetApi>) -> Self {
        Self::new(inner, DEFAULT_THROTTLE_WINDOW)
    }

    /// Detach pending requests a write to `filename` would make stale
    ///
    /// `keep` is the writing operation itself, whose identical calls may still
    /// join each other.
    fn writing(&self, post: PostId, filename: &Filename, keep: Operation) {
        let same_item = |key: &(PostId, Filename)| key.0 == post && key.1 == *filename;
        let same_draft =
            |key: &(PostId, DatasetDraft)| key.0 == post && key.1.filename == *filename;

        self.list.forget_where(|key| *key == post);
        self.get.forget_where(same_item);
        if keep != Operation::Create {
            self.create.forget_where(same_draft);
        }
        if keep != Operation::Update {
            self.update.forget_where(same_draft);
        }
        if keep != Operation::Delete {
            self.delete.forget_where(same_item);
        }
    }

    /// Coalescing statistics per operation
    #[must_use]
    pub fn stats(&self) -> ThrottleStats {
        ThrottleStats {
            list: self.list.stats(),
            get: self.get.stats(),
            create: self.create.stats(),
            update: self.update.stats(),
            delete: self.delete.stats(),
        }
    }
}

#[async_trait::async_trait]
impl DatasetApi for ThrottledDatasetApi {
    async fn list(&self, post: PostId) -> DatasetResult<Vec<DatasetSummary>> {
        let inner = self.inner.clone();
        self.list
            .run(post, move || async move { inner.list(post).await })
            .await
    }

    async fn get(&self, post: PostId, filename: &Filename) -> DatasetResult<Dataset> {
        let inner = self.inner.clone();
        let name = filename.clone();
        self.get
            .run((post, filename.clone()), move || async move {
                inner.get(post, &name).await
            })
            .await
    }

    async fn create(&self, post: PostId, draft: &DatasetDraft) -> DatasetResult<Dataset> {
        self.writing(post, &draft.filename, Operation::Create);
        let inner = self.inner.clone();
        let body = draft.clone();
        self.create
            .run((post, draft.clone()), move || async move {
                inner.create(post, &body).await
            })
            .await
    }

    async fn update(&self, post: PostId, draft: &DatasetDraft) -> DatasetResult<Dataset> {
        self.writing(post, &draft.filename, Operation::Update);
        let inner = self.inner.clone();
        let body = draft.clone();
        self.update
            .run((post, draft.clone()), move || async move {
                inner.update(post, &body).await
            })
            .await
    }

    async fn delete(&self, post: PostId, filename: &Filename) -> DatasetResult<bool> {
        self.writing(post, filename, Operation::Delete);
        let inner = self.inner.clone();
        let name = filename.clone();
        self.delete
            .run((post, filename.clone()), move || async move {
                inner.delete(post, &name).await
            })
            .await
    }
}
