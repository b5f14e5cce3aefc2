use datavis_dataset::FieldType;
use datavis_spec::{chart_type, set_color_field, set_y_field, ChartSpec, ChartType, COLOR_NONE};
use datavis_test_utils::{arc_spec, bar_spec};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn mark() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(json!("bar"))),
        Just(Some(json!("arc"))),
        Just(Some(json!({"type": "line", "point": true}))),
        Just(Some(json!({"type": "arc", "innerRadius": 40}))),
        Just(Some(json!(7))),
    ]
}

fn binding() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|field| json!({"field": field, "type": "nominal"})),
        "[a-z]{1,6}".prop_map(|field| json!({"field": field, "aggregate": "sum"})),
        Just(Value::Null),
    ]
}

fn any_spec() -> impl Strategy<Value = ChartSpec> {
    let channels = prop::sample::subsequence(
        vec!["x", "y", "x2", "theta", "radius", "color", "size"],
        0..=7,
    );
    (mark(), channels, prop::collection::vec(binding(), 7), any::<bool>()).prop_map(
        |(mark, channels, bindings, titled)| {
            let mut spec = Map::new();
            if let Some(mark) = mark {
                spec.insert("mark".into(), mark);
            }
            let encoding: Map<String, Value> = channels
                .into_iter()
                .zip(bindings)
                .map(|(channel, binding)| (channel.to_string(), binding))
                .collect();
            spec.insert("encoding".into(), Value::Object(encoding));
            if titled {
                spec.insert("title".into(), json!("Chart"));
            }
            ChartSpec::from_value(Value::Object(spec)).unwrap()
        },
    )
}

proptest! {
    #[test]
    fn prop_transform_is_idempotent(spec in any_spec()) {
        for mode in ChartType::ALL {
            let once = mode.transform(&spec);
            prop_assert_eq!(mode.transform(&once), once.clone());
            prop_assert!(mode.is_active(&once));
        }
    }

    #[test]
    fn prop_modes_are_exclusive(spec in any_spec()) {
        let radial = ChartType::Radial.transform(&spec);
        prop_assert!(!ChartType::Xy.is_active(&radial));
        prop_assert_eq!(chart_type(&radial), Some(ChartType::Radial));

        let xy = ChartType::Xy.transform(&spec);
        prop_assert!(!ChartType::Radial.is_active(&xy));
        prop_assert_eq!(chart_type(&xy), Some(ChartType::Xy));
    }

    #[test]
    fn prop_transform_keeps_unrelated_keys(spec in any_spec()) {
        for mode in ChartType::ALL {
            let next = mode.transform(&spec);
            prop_assert_eq!(next.get("title"), spec.get("title"));
            prop_assert_eq!(next.channel("color"), spec.channel("color"));
        }
    }

    #[test]
    fn prop_set_y_field_touches_only_y(spec in any_spec(), field in "[a-z]{1,8}") {
        let next = set_y_field(&spec, &field, FieldType::Quantitative);

        prop_assert_eq!(next.channel_field("y"), Some(field.as_str()));
        prop_assert_eq!(next.get("mark"), spec.get("mark"));
        for channel in ["x", "x2", "theta", "radius", "color", "size"] {
            prop_assert_eq!(next.channel(channel), spec.channel(channel));
        }
    }
}

#[test]
fn transform_round_trip_is_lossy() {
    let bar = ChartSpec::from_value(json!({
        "mark": {"type": "bar"},
        "encoding": {"x": {"field": "month"}, "y": {"field": "total"}}
    }))
    .unwrap();

    let radial = ChartType::Radial.transform(&bar);
    let back = ChartType::Xy.transform(&radial);

    assert_eq!(back.channel_field("x"), Some("unknown"));
    assert_eq!(back.channel_field("y"), Some("unknown"));
    assert_eq!(back.channel("x").unwrap()["type"], "quantitative");
    assert_ne!(back, bar);
    assert_eq!(back.mark_type(), Some("bar"));
}

#[test]
fn transform_active_spec_is_unchanged() {
    let bar = ChartSpec::from_value(bar_spec()).unwrap();
    assert_eq!(ChartType::Xy.transform(&bar), bar);

    let pie = ChartSpec::from_value(arc_spec()).unwrap();
    assert_eq!(ChartType::Radial.transform(&pie), pie);
}

#[test]
fn rebinding_color_none_on_fixture() {
    let bar = ChartSpec::from_value(bar_spec()).unwrap();
    let next = set_color_field(&bar, COLOR_NONE, FieldType::Nominal);

    let mut expected = bar_spec();
    expected["encoding"]
        .as_object_mut()
        .unwrap()
        .remove("color");
    assert_eq!(next.into_value(), expected);
}
