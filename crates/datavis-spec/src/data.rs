//! Data source of a chart spec
//!
//! A chart either carries its rows inline (`data.values`, or a bare array) or
//! points at a stored dataset (`data.url`).

use crate::spec::ChartSpec;
use datavis_dataset::DatasetSummary;
use serde_json::{json, Map, Value};

/// Where a chart gets its rows
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource<'a> {
    /// Rows embedded in the spec
    Inline(&'a [Value]),
    /// Rows loaded from a dataset URL
    Url(&'a str),
    /// No usable data
    Missing,
}

/// Inspect the data source of `spec`
#[must_use]
pub fn data_source(spec: &ChartSpec) -> DataSource<'_> {
    match spec.get("data") {
        Some(Value::Array(values)) => DataSource::Inline(values),
        Some(Value::Object(data)) => {
            if let Some(url) = data.get("url").and_then(Value::as_str) {
                DataSource::Url(url)
            } else if let Some(values) = data.get("values").and_then(Value::as_array) {
                DataSource::Inline(values)
            } else {
                DataSource::Missing
            }
        }
        _ => DataSource::Missing,
    }
}

/// Point the chart at a dataset URL, or switch back to inline data
///
/// With `None`, a URL source becomes `{"values": []}`; inline rows are kept.
/// Other `data` keys (`format`, `name`) survive either way.
#[must_use]
pub fn set_data_url(spec: &ChartSpec, url: Option<&str>) -> ChartSpec {
    let mut next = spec.clone();
    let mut data = match spec.get("data") {
        Some(Value::Object(data)) => data.clone(),
        Some(Value::Array(_)) if url.is_none() => return next,
        _ => Map::new(),
    };

    match url {
        Some(url) => {
            data.remove("values");
            data.insert("url".into(), Value::String(url.to_string()));
        }
        None => {
            if data.remove("url").is_none() && data.contains_key("values") {
                return next;
            }
            data.insert("values".into(), json!([]));
        }
    }
    next.insert("data", Value::Object(data));
    next
}

/// Dataset the chart currently points at, `None` for inline data
#[must_use]
pub fn selected_dataset<'a>(
    spec: &ChartSpec,
    datasets: &'a [DatasetSummary],
) -> Option<&'a DatasetSummary> {
    match data_source(spec) {
        DataSource::Url(url) => datasets.iter().find(|dataset| dataset.url == url),
        _ => None,
    }
}

/// Set the chart title
#[must_use]
pub fn set_title(spec: &ChartSpec, title: &str) -> ChartSpec {
    let mut next = spec.clone();
    next.insert("title", Value::String(title.to_string()));
    next
}
