//! Chart-type modes
//!
//! Two closed families: `xy` (Cartesian marks bound to x/y) and `radial`
//! (the `arc` mark bound to theta). Each mode recognizes its own specs and
//! migrates any spec into itself.
//!
//! Migration is a fresh start, not a round trip: channels of the other family
//! are dropped and required channels are filled with placeholders, so
//! `xy -> radial -> xy` loses the original x/y fields.

use crate::spec::{placeholder_binding, ChartSpec, SpecError, CARTESIAN_CHANNELS, RADIAL_CHANNELS};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Recognized chart-type family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Cartesian plot (bar, line, point, ...)
    Xy,
    /// Radial plot (pie, donut)
    Radial,
}

impl ChartType {
    /// Every mode, in selector order
    pub const ALL: [Self; 2] = [Self::Xy, Self::Radial];

    /// Human-readable name
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Xy => "X/Y plot",
            Self::Radial => "Radial plot",
        }
    }

    /// Stable identifier
    #[inline]
    #[must_use]
    pub fn value(self) -> &'static str {
        match self {
            Self::Xy => "xy",
            Self::Radial => "radial",
        }
    }

    /// Whether `spec` already belongs to this mode
    #[must_use]
    pub fn is_active(self, spec: &ChartSpec) -> bool {
        match self {
            Self::Xy => {
                !spec.is_arc()
                    && spec.has_channel("x")
                    && spec.has_channel("y")
                    && !spec.has_channel("theta")
            }
            Self::Radial => {
                spec.is_arc()
                    && spec.has_channel("theta")
                    && !spec.has_channel("x")
                    && !spec.has_channel("y")
            }
        }
    }

    /// Migrate `spec` into this mode
    ///
    /// Returns an equal copy when the mode is already active.
    #[must_use]
    pub fn transform(self, spec: &ChartSpec) -> ChartSpec {
        if self.is_active(spec) {
            return spec.clone();
        }
        tracing::debug!("Transforming chart spec to {}", self);

        let mut next = spec.clone();
        match self {
            Self::Xy => {
                if spec.is_arc() || spec.mark_type().is_none() {
                    next.insert("mark", json!({"type": "bar"}));
                }
                for channel in RADIAL_CHANNELS {
                    next.remove_channel(channel);
                }
                fill_placeholder(&mut next, "x");
                fill_placeholder(&mut next, "y");
            }
            Self::Radial => {
                if !spec.is_arc() {
                    next.insert("mark", json!({"type": "arc"}));
                }
                for channel in CARTESIAN_CHANNELS {
                    next.remove_channel(channel);
                }
                fill_placeholder(&mut next, "theta");
            }
        }
        next
    }
}

fn fill_placeholder(spec: &mut ChartSpec, channel: &str) {
    if !spec.has_channel(channel) {
        spec.encoding_mut().insert(channel.to_string(), placeholder_binding());
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.value())
    }
}

impl std::str::FromStr for ChartType {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.value() == s)
            .ok_or_else(|| SpecError::UnknownChartType(s.to_string()))
    }
}

/// Mode `spec` currently belongs to, `None` when it matches neither
#[must_use]
pub fn chart_type(spec: &ChartSpec) -> Option<ChartType> {
    ChartType::ALL.into_iter().find(|mode| mode.is_active(spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn spec(value: Value) -> ChartSpec {
        ChartSpec::from_value(value).unwrap()
    }

    #[test]
    fn mode_detection() {
        let bar = spec(json!({
            "mark": "bar",
            "encoding": {"x": {"field": "a"}, "y": {"field": "b"}}
        }));
        let pie = spec(json!({"mark": {"type": "arc"}, "encoding": {"theta": {"field": "b"}}}));
        let broken = spec(json!({"mark": "arc", "encoding": {"x": {"field": "a"}}}));

        assert_eq!(chart_type(&bar), Some(ChartType::Xy));
        assert_eq!(chart_type(&pie), Some(ChartType::Radial));
        assert_eq!(chart_type(&broken), None);
    }

    #[test]
    fn mode_radial_keeps_arc_mark_options() {
        let donut = spec(json!({
            "mark": {"type": "arc", "innerRadius": 50},
            "encoding": {"x": {"field": "a"}, "color": {"field": "c"}}
        }));
        let radial = ChartType::Radial.transform(&donut);

        assert_eq!(radial.get("mark"), Some(&json!({"type": "arc", "innerRadius": 50})));
        assert_eq!(
            radial.encoding().unwrap(),
            spec(json!({"encoding": {
                "color": {"field": "c"},
                "theta": {"field": "unknown", "type": "quantitative"}
            }}))
            .encoding()
            .unwrap()
        );
    }

    #[test]
    fn mode_xy_keeps_existing_cartesian_mark() {
        let line = spec(json!({
            "mark": {"type": "line", "point": true},
            "encoding": {"x": {"field": "a"}}
        }));
        let xy = ChartType::Xy.transform(&line);

        assert_eq!(xy.get("mark"), Some(&json!({"type": "line", "point": true})));
        assert_eq!(xy.channel_field("x"), Some("a"));
        assert_eq!(xy.channel_field("y"), Some("unknown"));
        assert!(ChartType::Xy.is_active(&xy));
    }

    #[test]
    fn mode_xy_from_empty_spec() {
        let xy = ChartType::Xy.transform(&ChartSpec::new());
        assert_eq!(xy.mark_type(), Some("bar"));
        assert_eq!(chart_type(&xy), Some(ChartType::Xy));
    }

    #[test]
    fn mode_from_str() {
        assert_eq!("radial".parse::<ChartType>(), Ok(ChartType::Radial));
        assert_eq!(
            "pie".parse::<ChartType>(),
            Err(SpecError::UnknownChartType("pie".into()))
        );
        assert_eq!(ChartType::Xy.label(), "X/Y plot");
    }
}
