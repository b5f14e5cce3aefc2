//! Chart specification document
//!
//! A chart specification is an open JSON object. Only `mark`, `encoding`,
//! `data` and `title` are interpreted here; every other key is carried
//! through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field name used for channels a transform had to invent
pub const PLACEHOLDER_FIELD: &str = "unknown";

/// Channels of Cartesian (x/y) charts
pub const CARTESIAN_CHANNELS: [&str; 4] = ["x", "y", "x2", "y2"];

/// Channels of radial (arc) charts
pub const RADIAL_CHANNELS: [&str; 4] = ["theta", "theta2", "radius", "radius2"];

/// Errors from chart specification handling
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// Specification is valid JSON but not an object
    #[error("chart specification must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Specification text is not valid JSON
    #[error("invalid chart specification JSON: {0}")]
    Parse(String),

    /// Chart type name not recognized
    #[error("unknown chart type '{0}' (expected xy or radial)")]
    UnknownChartType(String),

    /// Field is not a column of the sampled dataset
    #[error("field '{0}' is not a column of the dataset")]
    UnknownField(String),
}

/// Chart specification (open JSON object)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartSpec(Map<String, Value>);

impl ChartSpec {
    /// Empty specification
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value
    ///
    /// # Errors
    /// `SpecError::NotAnObject` unless `value` is an object
    pub fn from_value(value: Value) -> Result<Self, SpecError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SpecError::NotAnObject(json_kind(&other))),
        }
    }

    /// Parse JSON text
    ///
    /// # Errors
    /// `SpecError::Parse` or `SpecError::NotAnObject`
    pub fn from_json_str(text: &str) -> Result<Self, SpecError> {
        let value: Value = serde_json::from_str(text).map_err(|e| SpecError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    /// Top-level keys
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Unwrap into a JSON value
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Top-level value
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a top-level value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Remove a top-level value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Mark designator, from `{"type": ...}` or a bare string
    #[must_use]
    pub fn mark_type(&self) -> Option<&str> {
        match self.0.get("mark")? {
            Value::String(mark) => Some(mark),
            Value::Object(mark) => mark.get("type").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Whether the mark is `arc`
    #[inline]
    #[must_use]
    pub fn is_arc(&self) -> bool {
        self.mark_type() == Some("arc")
    }

    /// Channel mapping, if present
    #[must_use]
    pub fn encoding(&self) -> Option<&Map<String, Value>> {
        self.0.get("encoding").and_then(Value::as_object)
    }

    /// Channel mapping, created if absent or malformed
    pub fn encoding_mut(&mut self) -> &mut Map<String, Value> {
        let slot = self
            .0
            .entry("encoding")
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("encoding was just made an object"),
        }
    }

    /// Binding of a channel; `null` counts as absent
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<&Value> {
        self.encoding()?.get(name).filter(|v| !v.is_null())
    }

    /// Whether a channel is bound
    #[inline]
    #[must_use]
    pub fn has_channel(&self, name: &str) -> bool {
        self.channel(name).is_some()
    }

    /// Field bound to a channel
    #[must_use]
    pub fn channel_field(&self, name: &str) -> Option<&str> {
        self.channel(name)?.get("field").and_then(Value::as_str)
    }

    /// Remove a channel binding
    pub fn remove_channel(&mut self, name: &str) -> Option<Value> {
        self.0
            .get_mut("encoding")
            .and_then(Value::as_object_mut)
            .and_then(|encoding| encoding.remove(name))
    }

    /// Chart title, when it is a plain string
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }
}

impl From<ChartSpec> for Value {
    fn from(spec: ChartSpec) -> Self {
        spec.into_value()
    }
}

impl TryFrom<Value> for ChartSpec {
    type Error = SpecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl std::str::FromStr for ChartSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}

/// Placeholder binding for a channel a transform requires
#[must_use]
pub fn placeholder_binding() -> Value {
    serde_json::json!({"field": PLACEHOLDER_FIELD, "type": "quantitative"})
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(value: Value) -> ChartSpec {
        ChartSpec::from_value(value).unwrap()
    }

    #[test]
    fn spec_mark_type_forms() {
        assert_eq!(spec(json!({"mark": "arc"})).mark_type(), Some("arc"));
        assert_eq!(spec(json!({"mark": {"type": "bar"}})).mark_type(), Some("bar"));
        assert_eq!(spec(json!({"mark": 3})).mark_type(), None);
        assert_eq!(spec(json!({})).mark_type(), None);
    }

    #[test]
    fn spec_rejects_non_objects() {
        assert_eq!(
            ChartSpec::from_value(json!([1, 2])),
            Err(SpecError::NotAnObject("array"))
        );
        assert!(matches!(
            ChartSpec::from_json_str("{mark"),
            Err(SpecError::Parse(_))
        ));
    }

    #[test]
    fn spec_null_channel_is_absent() {
        let s = spec(json!({"encoding": {"x": null, "y": {"field": "total"}}}));
        assert!(!s.has_channel("x"));
        assert_eq!(s.channel_field("y"), Some("total"));
    }

    #[test]
    fn spec_encoding_mut_repairs_malformed() {
        let mut s = spec(json!({"encoding": "oops"}));
        s.encoding_mut().insert("x".into(), json!({"field": "a"}));
        assert_eq!(s.channel_field("x"), Some("a"));
        assert_eq!(s.remove_channel("x"), Some(json!({"field": "a"})));
        assert_eq!(s.remove_channel("x"), None);
    }
}
