//! Dataset API seam
//!
//! Five operations against the dataset collection of one host document.
//! Implemented over HTTP by [`crate::RestDatasetClient`], wrapped by
//! [`crate::ThrottledDatasetApi`], and in memory by the test utilities.

use datavis_dataset::{Dataset, DatasetDraft, DatasetResult, DatasetSummary, Filename, PostId};

/// Create/read/update/delete access to a document's datasets
#[async_trait::async_trait]
pub trait DatasetApi: Send + Sync {
    /// List datasets of a document (summaries only, never content)
    async fn list(&self, post: PostId) -> DatasetResult<Vec<DatasetSummary>>;

    /// Fetch one full record
    ///
    /// Implementations fail with `NotFound` when the returned record's
    /// filename differs from the requested one.
    async fn get(&self, post: PostId, filename: &Filename) -> DatasetResult<Dataset>;

    /// Create a dataset (the host upserts on an existing filename)
    async fn create(&self, post: PostId, draft: &DatasetDraft) -> DatasetResult<Dataset>;

    /// Overwrite the content of a dataset
    async fn update(&self, post: PostId, draft: &DatasetDraft) -> DatasetResult<Dataset>;

    /// Delete a dataset, reporting whether anything was removed
    async fn delete(&self, post: PostId, filename: &Filename) -> DatasetResult<bool>;
}

impl std::fmt::Debug for dyn DatasetApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn DatasetApi")
    }
}

/// Reject a single-item response that answers for another filename
///
/// # Errors
/// `DatasetError::NotFound` on mismatch
pub fn ensure_requested(requested: &Filename, dataset: Dataset) -> DatasetResult<Dataset> {
    if &dataset.filename != requested {
        tracing::warn!(
            requested = %requested,
            returned = %dataset.filename,
            "dataset response does not match requested filename"
        );
        return Err(datavis_dataset::DatasetError::dataset_not_found(requested));
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datavis_dataset::DatasetError;

    #[test]
    fn ensure_requested_rejects_mismatch() {
        let requested = Filename::new("sales.csv").unwrap();
        let other = Dataset::new(Filename::new("costs.csv").unwrap(), "a\n1", "");
        assert!(matches!(
            ensure_requested(&requested, other),
            Err(DatasetError::NotFound(_))
        ));

        let same = Dataset::new(requested.clone(), "a\n1", "");
        assert!(ensure_requested(&requested, same).is_ok());
    }
}
