//! HTTP implementation of the dataset API
//!
//! Route layout, below [`ClientConfig::collection_url`]:
//!
//! ```text
//! GET    /{post}/datasets             -> [{filename, url, rows}]
//! POST   /{post}/datasets             -> Dataset
//! GET    /{post}/datasets/{filename}  -> Dataset (JSON) or raw CSV (text/csv)
//! POST   /{post}/datasets/{filename}  -> Dataset
//! DELETE /{post}/datasets/{filename}  -> bool
//! ```

use crate::api::{ensure_requested, DatasetApi};
use crate::config::{ClientConfig, ConfigError};
use crate::rows_cache::CsvRowsCache;
use datavis_dataset::{
    Dataset, DatasetDraft, DatasetError, DatasetResult, DatasetSummary, Filename, PostId, Row,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("datavis-client/", env!("CARGO_PKG_VERSION"));

/// Host error codes that mean the request body itself was unacceptable
const VALIDATION_CODES: &[&str] = &["rest_missing_callback_param", "rest_invalid_param"];

/// Error envelope returned by the host REST API
#[derive(Debug, Default, Deserialize)]
struct HostError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// REST client for per-document datasets
#[derive(Debug, Clone)]
pub struct RestDatasetClient {
    client: reqwest::Client,
    config: ClientConfig,
    rows: CsvRowsCache,
}

impl RestDatasetClient {
    /// Create client from configuration
    ///
    /// # Errors
    /// `ConfigError::Invalid` for out-of-range settings, `ConfigError::Client`
    /// if the HTTP client cannot be built
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        let rows = CsvRowsCache::new(config.rows_cache_capacity, config.rows_cache_ttl());

        Ok(Self {
            client,
            config,
            rows,
        })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Dataset collection route of a document
    #[must_use]
    pub fn collection_url(&self, post: PostId) -> String {
        format!("{}/{}/datasets", self.config.collection_url(), post)
    }

    /// Single dataset route
    #[must_use]
    pub fn item_url(&self, post: PostId, filename: &Filename) -> String {
        format!("{}/{}", self.collection_url(post), filename)
    }

    /// Fetch the raw CSV body of a dataset
    ///
    /// Requests `text/csv` so the host serves `content` without the JSON
    /// envelope.
    ///
    /// # Errors
    /// Any [`DatasetError`]
    pub async fn fetch_csv(&self, post: PostId, filename: &Filename) -> DatasetResult<String> {
        let url = self.item_url(post, filename);
        self.fetch_text(&url).await
    }

    /// Fetch a dataset URL and parse it into rows, memoized per URL
    ///
    /// # Errors
    /// Any [`DatasetError`] from the fetch
    pub async fn fetch_rows(&self, url: &str) -> DatasetResult<Arc<Vec<Row>>> {
        self.rows
            .get_or_fetch(url, || self.fetch_text(url))
            .await
    }

    /// Forget memoized rows of a dataset URL
    pub async fn invalidate_rows(&self, url: &str) {
        self.rows.invalidate(url).await;
    }

    async fn fetch_text(&self, url: &str) -> DatasetResult<String> {
        tracing::debug!("Fetching CSV from {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/csv")
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response).await?;
        response.text().await.map_err(transport)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> DatasetResult<T> {
        let response = request.send().await.map_err(transport)?;
        let response = check_status(response).await?;
        let body = response.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|e| DatasetError::InvalidResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl DatasetApi for RestDatasetClient {
    async fn list(&self, post: PostId) -> DatasetResult<Vec<DatasetSummary>> {
        let url = self.collection_url(post);
        tracing::debug!("Listing datasets from {}", url);
        self.send_json(self.client.get(&url)).await
    }

    async fn get(&self, post: PostId, filename: &Filename) -> DatasetResult<Dataset> {
        let url = self.item_url(post, filename);
        tracing::debug!("Fetching dataset from {}", url);
        let dataset: Dataset = self
            .send_json(self.client.get(&url).query(&[("format", "json")]))
            .await?;
        ensure_requested(filename, dataset)
    }

    async fn create(&self, post: PostId, draft: &DatasetDraft) -> DatasetResult<Dataset> {
        let url = self.collection_url(post);
        tracing::info!(filename = %draft.filename, "Creating dataset on post {}", post);
        let dataset = self.send_json(self.client.post(&url).json(draft)).await?;
        self.rows.invalidate(&self.item_url(post, &draft.filename)).await;
        Ok(dataset)
    }

    async fn update(&self, post: PostId, draft: &DatasetDraft) -> DatasetResult<Dataset> {
        let url = self.item_url(post, &draft.filename);
        tracing::info!(filename = %draft.filename, "Updating dataset on post {}", post);
        let dataset = self.send_json(self.client.post(&url).json(draft)).await?;
        self.rows.invalidate(&url).await;
        Ok(dataset)
    }

    async fn delete(&self, post: PostId, filename: &Filename) -> DatasetResult<bool> {
        let url = self.item_url(post, filename);
        tracing::info!(filename = %filename, "Deleting dataset on post {}", post);
        let body: Value = self.send_json(self.client.delete(&url)).await?;
        self.rows.invalidate(&url).await;
        deleted_flag(&body)
    }
}

fn transport(err: reqwest::Error) -> DatasetError {
    DatasetError::NetworkFailure(err.to_string())
}

/// Map a non-success response onto the error taxonomy
async fn check_status(response: Response) -> DatasetResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let host: HostError = serde_json::from_str(&body).unwrap_or_default();
    let message = if host.message.is_empty() {
        status.to_string()
    } else {
        host.message
    };
    tracing::warn!(
        status = status.as_u16(),
        code = %host.code,
        "Dataset request failed: {}",
        message
    );

    Err(match status {
        StatusCode::NOT_FOUND => DatasetError::NotFound(message),
        StatusCode::BAD_REQUEST if VALIDATION_CODES.contains(&host.code.as_str()) => {
            DatasetError::ValidationFailed(message)
        }
        StatusCode::BAD_REQUEST => DatasetError::WriteFailed(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DatasetError::PermissionDenied(message),
        _ => DatasetError::NetworkFailure(format!("HTTP {}: {message}", status.as_u16())),
    })
}

/// Interpret a delete response: a bare boolean or `{"deleted": bool}`
fn deleted_flag(body: &Value) -> DatasetResult<bool> {
    match body {
        Value::Bool(deleted) => Ok(*deleted),
        Value::Object(map) => map
            .get("deleted")
            .and_then(Value::as_bool)
            .ok_or_else(|| DatasetError::InvalidResponse("missing 'deleted' flag".into())),
        other => Err(DatasetError::InvalidResponse(format!(
            "unexpected delete response: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> RestDatasetClient {
        RestDatasetClient::new(ClientConfig::new().with_base_url("https://site.example/")).unwrap()
    }

    #[test]
    fn rest_urls() {
        let client = client();
        let post = PostId::new(42).unwrap();
        let filename = Filename::new("sales.csv").unwrap();
        assert_eq!(
            client.collection_url(post),
            "https://site.example/wp-json/wp/v2/posts/42/datasets"
        );
        assert_eq!(
            client.item_url(post, &filename),
            "https://site.example/wp-json/wp/v2/posts/42/datasets/sales.csv"
        );
    }

    #[test]
    fn rest_rejects_invalid_config() {
        let result = RestDatasetClient::new(ClientConfig::new().with_base_url(""));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn deleted_flag_shapes() {
        assert_eq!(deleted_flag(&json!(true)), Ok(true));
        assert_eq!(deleted_flag(&json!(false)), Ok(false));
        assert_eq!(deleted_flag(&json!({"deleted": true})), Ok(true));
        assert!(matches!(
            deleted_flag(&json!("yes")),
            Err(DatasetError::InvalidResponse(_))
        ));
    }
}
