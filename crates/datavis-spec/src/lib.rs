//! Datavis Spec Transform Engine
//!
//! Pure functions over chart specifications: chart-type migration between the
//! `xy` and `radial` modes, single-channel field rebinding, data source
//! switching, and page embedding. Inputs are never mutated; every operation
//! returns a new [`ChartSpec`].
//!
//! # Example
//!
//! ```rust
//! use datavis_spec::{chart_type, ChartSpec, ChartType};
//!
//! let bar = ChartSpec::from_json_str(
//!     r#"{"mark": "bar", "encoding": {"x": {"field": "month"}, "y": {"field": "total"}}}"#,
//! ).unwrap();
//! let pie = ChartType::Radial.transform(&bar);
//!
//! assert_eq!(chart_type(&pie), Some(ChartType::Radial));
//! assert!(!pie.has_channel("x"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod binding;
pub mod data;
pub mod embed;
pub mod mode;
pub mod spec;

pub use binding::{
    bind_option, set_channel_field, set_color_field, set_theta_field, set_x_field, set_y_field,
    COLOR_NONE,
};
pub use data::{data_source, selected_dataset, set_data_url, set_title, DataSource};
pub use embed::{render_block, renderer_spec, VEGA_LITE_SCHEMA};
pub use mode::{chart_type, ChartType};
pub use spec::{ChartSpec, SpecError, PLACEHOLDER_FIELD};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
