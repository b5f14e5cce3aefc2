//! Dataset records
//!
//! A dataset is a named CSV payload attached to one host document. The
//! filename is both the record key and the REST sub-resource path segment.

use crate::csv;
use crate::error::{DatasetError, DatasetResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Same constraint the host applies to the `{filename}` route segment.
static FILENAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9\-_.]+$").expect("invalid filename regex"));

/// Host document (post) identifier
///
/// Zero is never a valid post; the host answers such requests with 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(u64);

impl PostId {
    /// Create post ID, rejecting zero
    ///
    /// # Errors
    /// `DatasetError::NotFound` for an ID of zero
    pub fn new(id: u64) -> DatasetResult<Self> {
        if id == 0 {
            return Err(DatasetError::post_not_found(id));
        }
        Ok(Self(id))
    }

    /// Get raw ID
    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for PostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<u64>()
            .map_err(|_| DatasetError::post_not_found(s))?;
        Self::new(id)
    }
}

/// Dataset filename, restricted to `[a-z0-9-_.]+`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Filename(String);

impl Filename {
    /// Validate and wrap a filename
    ///
    /// # Errors
    /// `DatasetError::ValidationFailed` if the name is empty, contains
    /// characters outside `[a-z0-9-_.]`, or is made only of dots
    pub fn new(name: impl Into<String>) -> DatasetResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DatasetError::ValidationFailed(
                "filename is required".to_string(),
            ));
        }
        if !FILENAME_PATTERN.is_match(&name) {
            return Err(DatasetError::ValidationFailed(format!(
                "filename '{name}' must match [a-z0-9-_.]+"
            )));
        }
        // `.` and `..` are path segments, not names
        if name.bytes().all(|b| b == b'.') {
            return Err(DatasetError::ValidationFailed(format!(
                "filename '{name}' must not be a relative path segment"
            )));
        }
        Ok(Self(name))
    }

    /// Filename the host assigns when none is given
    #[inline]
    #[must_use]
    pub fn default_name() -> Self {
        Self("data.csv".to_string())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Filename {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Filename {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Filename {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Filename {
    type Error = DatasetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Filename> for String {
    fn from(value: Filename) -> Self {
        value.0
    }
}

/// Full dataset record as served by the single-item endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Unique key within the document
    pub filename: Filename,
    /// Raw CSV including the header row
    pub content: String,
    /// Public URL of the CSV (set by the server)
    #[serde(default)]
    pub url: String,
    /// Data row count excluding the header (set by the server)
    #[serde(default)]
    pub rows: usize,
}

impl Dataset {
    /// Build a record, deriving `rows` from the content
    #[must_use]
    pub fn new(filename: Filename, content: impl Into<String>, url: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            rows: csv::row_count(&content),
            filename,
            content,
            url: url.into(),
        }
    }

    /// Content-free summary of this record
    #[inline]
    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::from(self)
    }
}

/// Content-free record returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Unique key within the document
    pub filename: Filename,
    /// Public URL of the CSV
    pub url: String,
    /// Data row count excluding the header
    pub rows: usize,
}

impl From<&Dataset> for DatasetSummary {
    fn from(dataset: &Dataset) -> Self {
        Self {
            filename: dataset.filename.clone(),
            url: dataset.url.clone(),
            rows: dataset.rows,
        }
    }
}

/// Write body for create and update calls
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetDraft {
    /// Target filename
    pub filename: Filename,
    /// CSV content with a header row
    pub content: String,
}

impl DatasetDraft {
    /// Validate a write body
    ///
    /// # Errors
    /// `DatasetError::ValidationFailed` if the filename is invalid or the
    /// content has no header row
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> DatasetResult<Self> {
        let filename = Filename::new(filename)?;
        let content = content.into();
        Self::validate_content(&content)?;
        Ok(Self { filename, content })
    }

    /// Build a draft for an already validated filename
    ///
    /// # Errors
    /// `DatasetError::ValidationFailed` if the content has no header row
    pub fn for_filename(filename: Filename, content: impl Into<String>) -> DatasetResult<Self> {
        let content = content.into();
        Self::validate_content(&content)?;
        Ok(Self { filename, content })
    }

    fn validate_content(content: &str) -> DatasetResult<()> {
        let header = content.split('\n').next().unwrap_or_default().trim();
        if header.is_empty() {
            return Err(DatasetError::ValidationFailed(
                "content must start with a header row".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_accepts_pattern() {
        for name in ["sales.csv", "q1-2024_totals.csv", "data", "a.b.c"] {
            assert!(Filename::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn filename_rejects_outside_pattern() {
        for name in ["", "Sales.csv", "a b.csv", "../etc/passwd", "data,csv"] {
            let result = Filename::new(name);
            assert!(
                matches!(result, Err(DatasetError::ValidationFailed(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn filename_rejects_dot_segments() {
        for name in [".", "..", "..."] {
            assert!(
                matches!(Filename::new(name), Err(DatasetError::ValidationFailed(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(Filename::new(".hidden.csv").is_ok());
        assert!(Filename::new("v1..2.csv").is_ok());
        assert!(serde_json::from_str::<Filename>("\"..\"").is_err());
    }

    #[test]
    fn filename_deserialize_validates() {
        let ok: Result<Filename, _> = serde_json::from_str("\"sales.csv\"");
        assert!(ok.is_ok());
        let bad: Result<Filename, _> = serde_json::from_str("\"Sales.CSV\"");
        assert!(bad.is_err());
    }

    #[test]
    fn filename_default_name() {
        assert_eq!(Filename::default_name().as_str(), "data.csv");
    }

    #[test]
    fn post_id_rejects_zero() {
        assert!(matches!(PostId::new(0), Err(DatasetError::NotFound(_))));
        assert_eq!(PostId::new(42).unwrap().get(), 42);
        assert!(matches!("abc".parse::<PostId>(), Err(DatasetError::NotFound(_))));
        assert_eq!("17".parse::<PostId>().unwrap().to_string(), "17");
    }

    #[test]
    fn dataset_new_derives_rows() {
        let dataset = Dataset::new(
            Filename::new("sales.csv").unwrap(),
            "month,total\nJan,100\nFeb,150\n",
            "http://example.test/sales.csv",
        );
        assert_eq!(dataset.rows, 2);
        assert_eq!(dataset.summary().rows, 2);
        assert_eq!(dataset.summary().filename.as_str(), "sales.csv");
    }

    #[test]
    fn dataset_deserialize_without_derived_fields() {
        let json = r#"{"filename":"a.csv","content":"x\n1"}"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();
        assert_eq!(dataset.url, "");
        assert_eq!(dataset.rows, 0);
    }

    #[test]
    fn draft_requires_header_row() {
        assert!(DatasetDraft::new("a.csv", "x,y\n1,2").is_ok());
        assert!(matches!(
            DatasetDraft::new("a.csv", ""),
            Err(DatasetError::ValidationFailed(_))
        ));
        assert!(matches!(
            DatasetDraft::new("a.csv", "\n1,2"),
            Err(DatasetError::ValidationFailed(_))
        ));
    }
}
