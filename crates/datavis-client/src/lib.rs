//! Datavis Dataset Client
//!
//! Typed access to the dataset collection of a host document.
//!
//! # Architecture
//!
//! ```text
//! DatasetStore → ThrottledDatasetApi → RestDatasetClient → host REST API
//!                   (Coalescer per op)     (reqwest)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use datavis_client::{ClientConfig, DatasetApi, RestDatasetClient, ThrottledDatasetApi};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load("datavis.toml")?;
//! let window = config.throttle_window();
//! let rest = Arc::new(RestDatasetClient::new(config)?);
//! let api = ThrottledDatasetApi::new(rest, window);
//!
//! let datasets = api.list(PostId::new(42)?).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod api;
pub mod config;
pub mod rest;
pub mod rows_cache;
pub mod throttle;
pub mod throttled;

pub use api::DatasetApi;
pub use config::{ClientConfig, ConfigError};
pub use rest::RestDatasetClient;
pub use rows_cache::CsvRowsCache;
pub use throttle::{Coalescer, CoalescerStats};
pub use throttled::{ThrottleStats, ThrottledDatasetApi, DEFAULT_THROTTLE_WINDOW};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
