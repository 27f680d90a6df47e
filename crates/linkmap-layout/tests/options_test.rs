use linkmap_layout::{
    Error, ForceOptions, GraphEdge, GraphNode, LayoutEngine, RadiusRange, Repulsion, degrees,
    layout, max_degree, node_radius,
};
use serde_json::{Map, Value, json};

#[test]
fn partial_json_overrides_only_named_fields() {
    let opts: ForceOptions = serde_json::from_value(json!({
        "iterations": 40,
        "damping": 0.8,
        "repulsion": { "kind": "barnes_hut", "theta": 0.5 }
    }))
    .expect("options");

    assert_eq!(opts.iterations, 40);
    assert_eq!(opts.damping, 0.8);
    assert_eq!(opts.repulsion, Repulsion::BarnesHut { theta: 0.5 });
    assert_eq!(opts.repulsion_strength, ForceOptions::DEFAULT_REPULSION_STRENGTH);
    assert_eq!(opts.padding, ForceOptions::DEFAULT_PADDING);
    assert_eq!(opts.convergence_threshold, None);
}

#[test]
fn engine_rejects_invalid_options() {
    let cases = [
        (
            ForceOptions {
                damping: 1.5,
                ..Default::default()
            },
            "damping",
        ),
        (
            ForceOptions {
                min_distance: 0.0,
                ..Default::default()
            },
            "min_distance",
        ),
        (
            ForceOptions {
                repulsion_strength: f64::NAN,
                ..Default::default()
            },
            "repulsion_strength",
        ),
        (
            ForceOptions {
                repulsion: Repulsion::BarnesHut { theta: -0.1 },
                ..Default::default()
            },
            "theta",
        ),
        (
            ForceOptions {
                convergence_threshold: Some(-1.0),
                ..Default::default()
            },
            "convergence_threshold",
        ),
    ];

    for (opts, expected) in cases {
        match LayoutEngine::new(opts) {
            Err(Error::InvalidOption { name, .. }) => assert_eq!(name, expected),
            other => panic!("expected invalid `{expected}`, got {other:?}"),
        }
    }
    assert!(LayoutEngine::new(ForceOptions::default()).is_ok());
}

#[test]
fn sim_nodes_serialize_with_flattened_metadata() {
    let mut meta = Map::new();
    meta.insert("title".to_string(), Value::from("Pricing"));
    meta.insert("hub".to_string(), Value::from(true));
    let nodes = vec![GraphNode::with_data("pricing", meta)];

    let out = layout(&nodes, &[], 800.0, 600.0);
    let v = serde_json::to_value(&out[0]).expect("json");
    assert_eq!(v["id"], "pricing");
    assert_eq!(v["title"], "Pricing");
    assert_eq!(v["hub"], true);
    assert!(v["x"].is_f64());
    assert!(v["vy"].is_f64());

    let parsed: GraphNode<Map<String, Value>> =
        serde_json::from_value(json!({"id": "a", "title": "A", "orphan": false})).expect("node");
    assert_eq!(parsed.id, "a");
    assert_eq!(parsed.data.get("orphan"), Some(&Value::from(false)));
}

#[test]
fn radius_is_min_when_no_edges_exist() {
    let range = RadiusRange::default();
    let nodes = vec![GraphNode::new("a"), GraphNode::new("b")];
    let d = degrees(&nodes, &[]);
    let max = max_degree(&d);
    assert_eq!(max, 0);
    for degree in d {
        assert_eq!(node_radius(degree, max, &range), range.min);
    }
}

#[test]
fn radius_grows_monotonically_up_to_max() {
    let range = RadiusRange { min: 3.0, max: 15.0 };
    let nodes: Vec<GraphNode> = ["hub", "mid", "leaf", "orphan"]
        .into_iter()
        .map(GraphNode::new)
        .collect();
    let edges = vec![
        GraphEdge::new("hub", "mid"),
        GraphEdge::new("hub", "leaf"),
        GraphEdge::new("mid", "hub"),
        GraphEdge::new("leaf", "hub"),
    ];
    let d = degrees(&nodes, &edges);
    let max = max_degree(&d);
    let radii: Vec<f64> = d.iter().map(|deg| node_radius(*deg, max, &range)).collect();

    assert_eq!(radii[0], range.max);
    assert_eq!(radii[3], range.min);
    assert!(radii[0] > radii[1]);
    assert!(radii[1] > radii[3]);
    assert_eq!(radii[1], radii[2]);

    let mut previous = f64::NEG_INFINITY;
    for degree in 0..=max {
        let r = range.radius(degree, max);
        assert!(r >= previous);
        assert!((range.min..=range.max).contains(&r));
        previous = r;
    }
}
