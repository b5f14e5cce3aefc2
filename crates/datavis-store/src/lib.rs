//! Datavis Dataset Store
//!
//! Session-scoped cache of a document's datasets. Passed explicitly to every
//! consumer (clone the handle); reads are cache-only and synchronous, writes
//! merge server-confirmed state and notify subscribers.
//!
//! # Example
//!
//! ```rust,ignore
//! use datavis_store::DatasetStore;
//!
//! let store = DatasetStore::new(post, api);
//! let saved = store.create_dataset(&draft).await?;
//! assert_eq!(store.get_dataset(&saved.filename), Some(saved));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod event;
pub mod store;

pub use event::StoreEvent;
pub use store::DatasetStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
