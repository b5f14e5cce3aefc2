//! Field-binding options sampled from a dataset
//!
//! The editor offers one option per CSV column. The encoding type is guessed
//! from the first data row: anything that parses as a finite number is
//! quantitative, everything else nominal. Options are never persisted.

use crate::csv;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Encoding type of a bound field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Numeric measure
    Quantitative,
    /// Categorical value
    Nominal,
}

impl FieldType {
    /// Infer type from one sampled value
    #[must_use]
    pub fn infer(sample: &str) -> Self {
        match sample.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Quantitative,
            _ => Self::Nominal,
        }
    }

    /// Wire name used in chart encodings
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quantitative => "quantitative",
            Self::Nominal => "nominal",
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selectable field for a chart channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldOption {
    /// Column header
    pub field: String,
    /// Inferred encoding type
    #[serde(rename = "type")]
    pub kind: FieldType,
}

impl FieldOption {
    /// Create option
    #[inline]
    #[must_use]
    pub fn new(field: impl Into<String>, kind: FieldType) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

/// Derive field options from CSV text
///
/// Columns without a sampled value are nominal.
#[must_use]
pub fn field_options(content: &str) -> Vec<FieldOption> {
    let sample = csv::parse(content).into_iter().next().unwrap_or_default();
    csv::columns(content)
        .into_iter()
        .map(|column| {
            let kind = sample
                .get(&column)
                .map_or(FieldType::Nominal, |value| FieldType::infer(value));
            FieldOption::new(column, kind)
        })
        .collect()
}

/// Look up the option for a column
#[must_use]
pub fn find_option<'a>(options: &'a [FieldOption], field: &str) -> Option<&'a FieldOption> {
    options.iter().find(|option| option.field == field)
}
