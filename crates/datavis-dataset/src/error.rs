//! Error types for dataset operations
//!
//! One taxonomy is shared by the remote client, the store and the in-memory
//! backend:
//! - `NotFound`: unknown document or dataset filename (HTTP 404)
//! - `ValidationFailed`: missing or malformed `filename`/`content` (HTTP 400)
//! - `WriteFailed`: the host rejected the write (HTTP 400)
//! - `PermissionDenied`: the caller may not touch the document (HTTP 401/403)
//! - `NetworkFailure`: the REST API could not be reached, or answered with an
//!   unexpected status such as a 5xx

/// Errors raised while reading or writing datasets
///
/// `Clone` so a single coalesced result can be handed to every waiting caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    /// Unknown document ID or dataset filename
    #[error("not found: {0}")]
    NotFound(String),

    /// Required write fields are missing or malformed
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Persistence layer rejected the write
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Caller lacks the capability for this document
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Transport-level failure reaching the REST API
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl DatasetError {
    /// Create not-found error for a dataset filename
    pub fn dataset_not_found(filename: impl AsRef<str>) -> Self {
        Self::NotFound(format!("invalid dataset filename '{}'", filename.as_ref()))
    }

    /// Create not-found error for a host document
    pub fn post_not_found(post: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("invalid post ID {post}"))
    }

    /// Check if error is retryable
    ///
    /// Only transport failures and unexpected host statuses are; nothing
    /// retries automatically.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure(_))
    }

    /// HTTP status the host surfaces this condition with
    #[inline]
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::ValidationFailed(_) | Self::WriteFailed(_) => Some(400),
            Self::PermissionDenied(_) => Some(403),
            Self::NetworkFailure(_) | Self::InvalidResponse(_) => None,
        }
    }
}

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DatasetError::dataset_not_found("sales.csv");
        assert_eq!(err.to_string(), "not found: invalid dataset filename 'sales.csv'");
    }

    #[test]
    fn error_status_mapping() {
        assert_eq!(DatasetError::post_not_found(7).http_status(), Some(404));
        assert_eq!(
            DatasetError::ValidationFailed("content".into()).http_status(),
            Some(400)
        );
        assert_eq!(DatasetError::WriteFailed("x".into()).http_status(), Some(400));
        assert_eq!(DatasetError::PermissionDenied("x".into()).http_status(), Some(403));
        assert_eq!(DatasetError::NetworkFailure("x".into()).http_status(), None);
    }

    #[test]
    fn error_only_network_is_retryable() {
        assert!(DatasetError::NetworkFailure("reset".into()).is_retryable());
        assert!(!DatasetError::WriteFailed("x".into()).is_retryable());
        assert!(!DatasetError::NotFound("x".into()).is_retryable());
        assert!(!DatasetError::PermissionDenied("x".into()).is_retryable());
    }
}
