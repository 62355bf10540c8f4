use hierchart_rs::api::CHART_CONFIG_JSON_SCHEMA_V1;
use hierchart_rs::core::Viewport;
use hierchart_rs::layout::{
    CirclePackConfig, FlowAlignment, FlowConfig, SortPolicy, SortType, SunburstConfig,
    TreemapConfig,
};
use hierchart_rs::{FlowChartConfig, HierChartConfig, HierLayoutKind};

#[test]
fn hier_config_json_roundtrip_keeps_every_section() {
    let config = HierChartConfig::new(Viewport::new(640, 480), HierLayoutKind::Sunburst)
        .with_circle(CirclePackConfig {
            order: SortPolicy::Descending,
            padding: 1.5,
        })
        .with_treemap(TreemapConfig::flat())
        .with_sunburst(SunburstConfig {
            sort_type: SortType::Name,
            multi_root: true,
            ..SunburstConfig::default()
        })
        .with_drill_path("europe/france");

    let json = config.to_json_pretty().expect("serialize");
    assert!(json.contains(&format!("\"schema_version\": {CHART_CONFIG_JSON_SCHEMA_V1}")));
    assert!(json.contains("\"sunburst\""));

    let restored = HierChartConfig::from_json_str(&json).expect("parse");
    assert_eq!(restored, config);
}

#[test]
fn bare_config_object_fills_defaults() {
    let json = r#"{ "viewport": { "width": 300, "height": 200 }, "kind": "treemap" }"#;
    let config = HierChartConfig::from_json_str(json).expect("parse");

    assert_eq!(config.kind, HierLayoutKind::Treemap);
    assert_eq!(config.treemap, TreemapConfig::default());
    assert_eq!(config.circle.order, SortPolicy::Insertion);
    assert_eq!(config.drill_path, None);
}

#[test]
fn unsupported_schema_version_is_rejected() {
    let json = r#"{
        "schema_version": 99,
        "config": { "viewport": { "width": 300, "height": 200 } }
    }"#;
    let err = HierChartConfig::from_json_str(json).expect_err("future schema");
    assert!(err.to_string().contains("99"));
}

#[test]
fn parsed_config_is_validated() {
    let json = r#"{ "viewport": { "width": 0, "height": 200 } }"#;
    assert!(HierChartConfig::from_json_str(json).is_err());

    let json = r#"{
        "viewport": { "width": 100, "height": 100 },
        "sunburst": { "inner_radius_ratio": 0.9, "outer_radius_ratio": 0.2 }
    }"#;
    assert!(HierChartConfig::from_json_str(json).is_err());

    assert!(HierChartConfig::from_json_str("not json").is_err());
}

#[test]
fn flow_config_json_roundtrip() {
    let config = FlowChartConfig::new(Viewport::new(800, 600)).with_flow(FlowConfig {
        alignment: FlowAlignment::Src,
        node_width: 20.0,
        node_gap: 4.0,
        passes: 10,
    });

    let json = config.to_json_pretty().expect("serialize");
    let restored = FlowChartConfig::from_json_str(&json).expect("parse");
    assert_eq!(restored, config);

    let bare = FlowChartConfig::from_json_str(r#"{ "viewport": { "width": 10, "height": 10 } }"#)
        .expect("bare");
    assert_eq!(bare.flow, FlowConfig::default());
}
