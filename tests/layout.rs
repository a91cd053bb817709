use bundle_constellation::GraphError;
use bundle_constellation::bundle::{GroupTable, parse_bundles};
use bundle_constellation::config::{LayoutConfig, Placement};
use bundle_constellation::graph::Graph;
use bundle_constellation::physics::{CENTER, CHARGE, COLLIDE};
use bundle_constellation::simulation::{RunState, Simulation};
use eframe::egui::{Vec2, vec2};

const MAX_TICKS: usize = 10_000;

fn graph(raw: &str, config: &LayoutConfig) -> Graph {
    let bundles = parse_bundles(raw).expect("fixture parses");
    Graph::build(&bundles, &GroupTable::new(), config).expect("fixture builds")
}

fn settle(graph: Graph, config: &LayoutConfig) -> Simulation {
    let mut simulation = Simulation::from_config(graph, config);
    simulation.start();
    simulation.run_until_settled(MAX_TICKS);
    assert_eq!(simulation.state(), RunState::Converged);
    simulation
}

fn positions(simulation: &Simulation) -> Vec<Vec2> {
    simulation.nodes().iter().map(|node| node.position).collect()
}

const PORTAL: &str = r#"{
    "10": { "name": "portal.kernel", "dependsOn": [] },
    "11": { "name": "portal.impl", "dependsOn": [10] },
    "12": { "name": "portal.web", "dependsOn": [10, 11] },
    "13": { "name": "site.admin", "dependsOn": [12] },
    "14": { "name": "site.blog", "dependsOn": [12, 10] }
}"#;

#[test]
fn converged_layout_is_a_fixed_point() {
    let config = LayoutConfig::default();
    let mut simulation = settle(graph(PORTAL, &config), &config);
    assert!(simulation.alpha() < simulation.alpha_min());

    let settled = positions(&simulation);
    for _ in 0..25 {
        assert!(!simulation.step(), "a converged engine must not tick");
    }
    assert_eq!(positions(&simulation), settled);
}

#[test]
fn single_link_settles_at_its_rest_length() {
    let config = LayoutConfig::default();
    let raw = r#"{
        "a": { "name": "a", "dependsOn": ["b"], "x": 2450, "y": 2500 },
        "b": { "name": "b", "x": 2550, "y": 2500 }
    }"#;
    let mut simulation = Simulation::from_config(graph(raw, &config), &config);
    for name in [CHARGE, CENTER, COLLIDE] {
        assert!(simulation.remove_force(name), "missing force {name}");
    }

    simulation.start();
    simulation.run_until_settled(MAX_TICKS);

    let nodes = simulation.nodes();
    let distance = (nodes[0].position - nodes[1].position).length();
    assert!((distance - 200.0).abs() < 1.0, "settled at {distance}");
}

#[test]
fn pinned_nodes_hold_while_still_pushing_others() {
    let config = LayoutConfig::default();
    let raw = r#"{
        "anchor": { "name": "anchor", "x": 2500, "y": 2500 },
        "free": { "name": "free", "x": 2650, "y": 2500 }
    }"#;
    let mut simulation = Simulation::from_config(graph(raw, &config), &config);
    assert!(simulation.remove_force(CENTER));
    let anchor = simulation.graph().index_of("anchor").unwrap();
    let free = simulation.graph().index_of("free").unwrap();
    let pin = vec2(2500.0, 2500.0);
    simulation.node_mut(anchor).unwrap().pin(pin);

    simulation.start();
    for _ in 0..120 {
        simulation.step();
        assert_eq!(simulation.nodes()[anchor].position, pin);
        assert_eq!(simulation.nodes()[anchor].velocity, Vec2::ZERO);
    }

    let free_node = &simulation.nodes()[free];
    assert!(
        free_node.position.x > 2650.0,
        "repulsion from the pinned node should push the other away, got {:?}",
        free_node.position
    );
    assert!((free_node.position.y - 2500.0).abs() < 1e-3);
}

#[test]
fn dangling_dependency_fails_before_any_tick() {
    let bundles = parse_bundles(
        r#"{
            "1": { "name": "portal.kernel", "dependsOn": [] },
            "2": { "name": "portal.web", "dependsOn": [1, 7] }
        }"#,
    )
    .unwrap();

    let error = Graph::build(&bundles, &GroupTable::new(), &LayoutConfig::default()).unwrap_err();
    assert_eq!(
        error,
        GraphError::DanglingDependency {
            bundle: "2".into(),
            missing: "7".into(),
        }
    );
    assert!(error.to_string().contains("'7'"));
}

#[test]
fn group_on_the_bundle_beats_the_table() {
    let groups = GroupTable::new().with_group("core", &["portal.kernel", "portal.web"]);
    let bundles = parse_bundles(
        r#"{
            "1": { "name": "portal.kernel", "group": "war" },
            "2": { "name": "portal.web", "dependsOn": [1], "group": null },
            "3": { "name": "site.blog", "dependsOn": [2], "group": 7 }
        }"#,
    )
    .unwrap();

    let graph = Graph::build(&bundles, &groups, &LayoutConfig::default()).unwrap();
    assert_eq!(graph.node("1").unwrap().group, "war");
    assert_eq!(graph.node("2").unwrap().group, "core");
    assert_eq!(graph.node("3").unwrap().group, "7");
}

#[test]
fn same_seed_gives_identical_layouts() {
    let raw = r#"{
        "a": { "name": "a", "dependsOn": ["b", "c"] },
        "b": { "name": "b", "dependsOn": ["c"] },
        "c": { "name": "c" },
        "d": { "name": "d", "dependsOn": ["a"] },
        "e": { "name": "e", "dependsOn": ["a", "d"] },
        "f": { "name": "f" }
    }"#;
    let seeded = |seed: u64| {
        let config = LayoutConfig {
            seed,
            ..LayoutConfig::default()
        };
        positions(&settle(graph(raw, &config), &config))
    };

    let first = seeded(42);
    assert_eq!(first, seeded(42));
    assert_ne!(first, seeded(43));
}

#[test]
fn collinear_chain_spreads_out_around_the_center() {
    let config = LayoutConfig::default();
    let raw = r#"{
        "A": { "name": "A", "dependsOn": ["B"], "x": 2400, "y": 2400 },
        "B": { "name": "B", "dependsOn": ["C"], "x": 2500, "y": 2500 },
        "C": { "name": "C", "x": 2600, "y": 2600 }
    }"#;
    let simulation = settle(graph(raw, &config), &config);
    let settled = positions(&simulation);

    for (index, a) in settled.iter().enumerate() {
        for b in &settled[index + 1..] {
            let gap = (*a - *b).length();
            assert!(gap >= 50.0, "nodes only {gap} apart");
        }
    }

    let centroid = simulation.graph().centroid();
    assert!(
        (centroid - config.center()).length() < 25.0,
        "centroid drifted to {centroid:?}"
    );
}

#[test]
fn large_graphs_settle_through_the_quadtree_paths() {
    let config = LayoutConfig {
        placement: Placement::Phyllotaxis,
        ..LayoutConfig::default()
    };
    let entries = (0..320)
        .map(|index| {
            let depends = if index == 0 {
                String::new()
            } else {
                format!("\"{}\"", (index - 1) / 3)
            };
            format!(r#""{index}": {{ "name": "bundle.{index}", "dependsOn": [{depends}] }}"#)
        })
        .collect::<Vec<_>>()
        .join(",");
    let raw = format!("{{{entries}}}");

    let simulation = settle(graph(&raw, &config), &config);

    assert!(simulation.nodes().iter().all(|node| {
        node.position.x.is_finite() && node.position.y.is_finite()
    }));
    let centroid = simulation.graph().centroid();
    assert!((centroid - config.center()).length() < 500.0, "centroid at {centroid:?}");

    let settled = positions(&simulation);
    for (index, a) in settled.iter().enumerate() {
        for (offset, b) in settled[index + 1..].iter().enumerate() {
            let gap = (*a - *b).length();
            assert!(gap >= 50.0, "nodes {index} and {} only {gap} apart", index + 1 + offset);
        }
    }
}
