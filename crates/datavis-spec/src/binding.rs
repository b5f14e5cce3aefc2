//! Single-channel field rebinding
//!
//! Each setter rewrites `{field, type}` of exactly one channel and leaves the
//! rest of the spec alone. Other keys on the rebound channel (`aggregate`,
//! `sort`, ...) survive.

use crate::spec::{ChartSpec, SpecError};
use datavis_dataset::fields::find_option;
use datavis_dataset::{FieldOption, FieldType};
use serde_json::{Map, Value};

/// Color field that removes the color channel
pub const COLOR_NONE: &str = "none";

/// Bind `field` with `kind` to `channel`
#[must_use]
pub fn set_channel_field(
    spec: &ChartSpec,
    channel: &str,
    field: &str,
    kind: FieldType,
) -> ChartSpec {
    let mut next = spec.clone();
    let encoding = next.encoding_mut();
    let mut binding = match encoding.remove(channel) {
        Some(Value::Object(existing)) => existing,
        _ => Map::new(),
    };
    binding.insert("field".into(), Value::String(field.to_string()));
    binding.insert("type".into(), Value::String(kind.as_str().to_string()));
    encoding.insert(channel.to_string(), Value::Object(binding));
    next
}

/// Bind the x channel
#[inline]
#[must_use]
pub fn set_x_field(spec: &ChartSpec, field: &str, kind: FieldType) -> ChartSpec {
    set_channel_field(spec, "x", field, kind)
}

/// Bind the y channel
#[inline]
#[must_use]
pub fn set_y_field(spec: &ChartSpec, field: &str, kind: FieldType) -> ChartSpec {
    set_channel_field(spec, "y", field, kind)
}

/// Bind the theta channel
#[inline]
#[must_use]
pub fn set_theta_field(spec: &ChartSpec, field: &str, kind: FieldType) -> ChartSpec {
    set_channel_field(spec, "theta", field, kind)
}

/// Bind the color channel; [`COLOR_NONE`] removes it
#[must_use]
pub fn set_color_field(spec: &ChartSpec, field: &str, kind: FieldType) -> ChartSpec {
    if field == COLOR_NONE {
        let mut next = spec.clone();
        next.remove_channel("color");
        return next;
    }
    set_channel_field(spec, "color", field, kind)
}

/// Bind a channel to a dataset column, taking its type from the sampled options
///
/// `color` honours [`COLOR_NONE`].
///
/// # Errors
/// `SpecError::UnknownField` if `field` is not among `options`
pub fn bind_option(
    spec: &ChartSpec,
    channel: &str,
    field: &str,
    options: &[FieldOption],
) -> Result<ChartSpec, SpecError> {
    if channel == "color" && field == COLOR_NONE {
        return Ok(set_color_field(spec, field, FieldType::Nominal));
    }
    let option = find_option(options, field)
        .ok_or_else(|| SpecError::UnknownField(field.to_string()))?;
    Ok(set_channel_field(spec, channel, &option.field, option.kind))
}
