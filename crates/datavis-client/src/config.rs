//! Client configuration
//!
//! Loaded from TOML with environment overrides. Every field has a default so
//! an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`ClientConfig::base_url`]
pub const ENV_BASE_URL: &str = "DATAVIS_BASE_URL";
/// Environment variable overriding [`ClientConfig::collection`]
pub const ENV_COLLECTION: &str = "DATAVIS_COLLECTION";

/// Errors while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed to load
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or type error
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Semantically invalid value
    #[error("invalid config value: {0}")]
    Invalid(String),

    /// HTTP client could not be built from this configuration
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Dataset client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Site root, e.g. `https://example.org`
    pub base_url: String,
    /// REST root below the site, e.g. `wp-json`
    pub rest_prefix: String,
    /// Route namespace of the document collection
    pub rest_namespace: String,
    /// Collection slug of the host documents
    pub collection: String,
    /// Coalescing window for identical requests
    pub throttle_window_ms: u64,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Lifetime of parsed CSV rows fetched by URL
    pub rows_cache_ttl_secs: u64,
    /// Maximum number of cached CSV row sets
    pub rows_cache_capacity: u64,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With site root
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With collection slug
    #[inline]
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// With coalescing window
    #[inline]
    #[must_use]
    pub fn with_throttle_window(mut self, window: Duration) -> Self {
        self.throttle_window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed TOML, `ConfigError::Invalid` on
    /// out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration file, then apply environment overrides
    ///
    /// # Errors
    /// Any [`ConfigError`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `DATAVIS_*` environment overrides
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Ok(collection) = std::env::var(ENV_COLLECTION) {
            self.collection = collection;
        }
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(ConfigError::Invalid("collection must not be empty".into()));
        }
        if self.throttle_window_ms == 0 {
            return Err(ConfigError::Invalid(
                "throttle_window_ms must be positive".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Coalescing window as duration
    #[inline]
    #[must_use]
    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_window_ms)
    }

    /// Request timeout as duration
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Rows cache lifetime as duration
    #[inline]
    #[must_use]
    pub fn rows_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.rows_cache_ttl_secs)
    }

    /// Collection route, e.g. `http://host/wp-json/wp/v2/posts`
    #[must_use]
    pub fn collection_url(&self) -> String {
        let mut url = self.base_url.trim_end_matches('/').to_string();
        for segment in [&self.rest_prefix, &self.rest_namespace, &self.collection] {
            let segment = segment.trim_matches('/');
            if !segment.is_empty() {
                url.push('/');
                url.push_str(segment);
            }
        }
        url
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            rest_prefix: "wp-json".to_string(),
            rest_namespace: "wp/v2".to_string(),
            collection: "posts".to_string(),
            throttle_window_ms: 200,
            timeout_secs: 30,
            rows_cache_ttl_secs: 60,
            rows_cache_capacity: 256,
        }
    }
}
