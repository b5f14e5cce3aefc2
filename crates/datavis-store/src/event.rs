//! Change notifications emitted by the store

use datavis_dataset::Filename;

/// Cache change observed by subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A list reload was merged
    Refreshed,
    /// A dataset was created, updated or loaded
    Upserted(Filename),
    /// A dataset left the cache
    Removed(Filename),
}

impl StoreEvent {
    /// Filename the event concerns, if any
    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&Filename> {
        match self {
            Self::Refreshed => None,
            Self::Upserted(filename) | Self::Removed(filename) => Some(filename),
        }
    }
}
