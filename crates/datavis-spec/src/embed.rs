//! Published-page embedding
//!
//! The block attribute holds the chart spec verbatim. The page gets a
//! container carrying the spec as a JSON script tag plus a mount point; the
//! renderer receives the spec with the Vega-Lite schema URI prefixed in.

use crate::spec::ChartSpec;
use datavis_dataset::Row;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Schema URI the renderer expects
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Spec as handed to the renderer
///
/// Keys of `spec` take precedence over the schema default. When `rows` are
/// given they replace the data source as inline `data.values`.
#[must_use]
pub fn renderer_spec(spec: &ChartSpec, rows: Option<&[Row]>) -> Value {
    let mut out = Map::new();
    out.insert("$schema".into(), Value::String(VEGA_LITE_SCHEMA.to_string()));
    for (key, value) in spec.as_map() {
        out.insert(key.clone(), value.clone());
    }

    if let Some(rows) = rows {
        let values = rows
            .iter()
            .map(|row| {
                Value::Object(
                    row.iter()
                        .map(|(column, cell)| (column.clone(), Value::String(cell.clone())))
                        .collect(),
                )
            })
            .collect();
        let mut data = Map::new();
        data.insert("values".into(), Value::Array(values));
        out.insert("data".into(), Value::Object(data));
    }
    Value::Object(out)
}

/// Container markup for a chart block attribute
///
/// Absent or empty attributes render nothing.
#[must_use]
pub fn render_block(attribute: Option<&Value>) -> String {
    match attribute {
        Some(json) if !is_empty_attribute(json) => {
            let chart_id = format!("chart-{}", Uuid::new_v4().simple());
            render_with_id(json, &chart_id)
        }
        _ => String::new(),
    }
}

fn render_with_id(json: &Value, chart_id: &str) -> String {
    let datavis = format!("{chart_id}-datavis");
    let config = format!("{chart_id}-config");
    // Keep the payload from closing the script element
    let payload = json.to_string().replace("</", "<\\/");

    format!(
        "<div class=\"datavis-block\" data-datavis=\"{datavis}\" data-config=\"{config}\">\n\
         \t<script id=\"{config}\" type=\"application/json\">{payload}</script>\n\
         \t<div id=\"{datavis}\"></div>\n\
         </div>\n"
    )
}

fn is_empty_attribute(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Bool(true) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn embed_empty_attributes_render_nothing() {
        assert_eq!(render_block(None), "");
        assert_eq!(render_block(Some(&Value::Null)), "");
        assert_eq!(render_block(Some(&json!({}))), "");
        assert_eq!(render_block(Some(&json!(""))), "");
    }

    #[test]
    fn embed_markup_layout() {
        let html = render_with_id(&json!({"mark": "bar"}), "chart-1");
        assert_eq!(
            html,
            concat!(
                "<div class=\"datavis-block\" data-datavis=\"chart-1-datavis\" ",
                "data-config=\"chart-1-config\">\n",
                "\t<script id=\"chart-1-config\" type=\"application/json\">",
                "{\"mark\":\"bar\"}</script>\n",
                "\t<div id=\"chart-1-datavis\"></div>\n",
                "</div>\n",
            )
        );
    }

    #[test]
    fn embed_escapes_script_close() {
        let html = render_with_id(&json!({"title": "</script><b>"}), "c");
        assert!(html.contains("<\\/script><b>"));
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn embed_unique_chart_ids() {
        let spec = json!({"mark": "bar"});
        assert_ne!(render_block(Some(&spec)), render_block(Some(&spec)));
    }

    #[test]
    fn embed_renderer_spec_prefixes_schema() {
        let spec =
            ChartSpec::from_value(json!({"mark": "bar", "data": {"url": "/d/a.csv"}})).unwrap();

        let plain = renderer_spec(&spec, None);
        assert_eq!(plain["$schema"], VEGA_LITE_SCHEMA);
        assert_eq!(plain["data"], json!({"url": "/d/a.csv"}));

        let rows = datavis_dataset::csv::parse("a,b\n1,x\n");
        let inline = renderer_spec(&spec, Some(&rows));
        assert_eq!(inline["data"], json!({"values": [{"a": "1", "b": "x"}]}));

        let custom = ChartSpec::from_value(json!({"$schema": "custom"})).unwrap();
        assert_eq!(renderer_spec(&custom, None)["$schema"], "custom");
    }
}
