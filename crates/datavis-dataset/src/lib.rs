//! Datavis Dataset Model
//!
//! CSV datasets attached to host documents, and the pure helpers around them.
//!
//! # Core Concepts
//!
//! - [`Dataset`]: full record (`filename`, `content`, derived `url` and `rows`)
//! - [`DatasetSummary`]: content-free list form
//! - [`DatasetDraft`]: validated write body
//! - [`csv`]: header-first CSV codec without quoting support
//! - [`FieldOption`]: channel binding candidates sampled from a dataset
//! - [`DatasetError`]: error taxonomy shared by client, store and backends
//!
//! # Example
//!
//! ```rust
//! use datavis_dataset::{csv, DatasetDraft};
//!
//! let draft = DatasetDraft::new("sales.csv", "month,total\nJan,100\nFeb,150\n").unwrap();
//! assert_eq!(csv::row_count(&draft.content), 2);
//! assert_eq!(csv::parse(&draft.content)[0]["total"], "100");
//! ```

#![warn(unreachable_pub)]

pub mod csv;
pub mod error;
pub mod fields;
pub mod model;

pub use csv::Row;
pub use error::{DatasetError, DatasetResult};
pub use fields::{field_options, FieldOption, FieldType};
pub use model::{Dataset, DatasetDraft, DatasetSummary, Filename, PostId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
