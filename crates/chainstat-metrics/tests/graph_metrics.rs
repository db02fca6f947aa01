//! Known-topology regression tests for the metric bundle.
//!
//! Each test parses a hand-crafted graph with known properties. Expected
//! values are computed analytically and hardcoded, so any algorithm change
//! that shifts them will be caught.

use chainstat_core::graph::parse_graph;
use chainstat_core::{DirectedGraph, MetricsSettings, NeighborDirection};
use chainstat_metrics::components::{containment, largest_component_modularity, strong_components};
use chainstat_metrics::pagerank::{PageRankConfig, pagerank};
use chainstat_metrics::similarity::{cosine_similarity, mean_cosine_similarity};
use chainstat_metrics::structure::{degree_one, density, reciprocity};
use chainstat_metrics::{COLUMNS, Cell, compute_graph_metrics, compute_table, z_normalize};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load(json: &str) -> DirectedGraph {
    parse_graph(json).expect("valid graph JSON")
}

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {expected}, got {actual}"
    );
}

// ---------------------------------------------------------------------------
// Mutual pair plus isolated node
// ---------------------------------------------------------------------------

#[test]
fn mutual_pair_with_isolated_node() {
    let g = load(r#"[{"a": ["b"], "b": ["a"], "c": []}]"#);
    let sccs = strong_components(&g);

    assert_eq!(sccs.len(), 2);
    assert_eq!(
        sccs.largest().expect("non-empty").members,
        vec!["a".to_string(), "b".to_string()]
    );
    assert_eq!(sccs.components()[1].members, vec!["c".to_string()]);

    let c = containment(&g, &sccs);
    assert_eq!(c.nodes, 2);
    assert_close(c.fraction, 2.0 / 3.0, 1e-12);
    assert_eq!(reciprocity(&g), Some(1.0));
}

#[test]
fn mutual_pair_full_row() {
    let g = load(r#"[{"a": ["b"], "b": ["a"], "c": []}]"#);
    let m = compute_graph_metrics(&g, &MetricsSettings::default()).expect("metrics");

    assert_eq!(m.nodes, 3);
    assert_eq!(m.edges, 2);
    assert_close(m.density, 0.333_333, 1e-12);
    assert_eq!(m.nodes_largest_strong_comp, 2);
    assert_eq!(m.nodes_deg_one, 0);
    assert_close(m.pct_nodes_deg_one, 0.0, f64::EPSILON);
    assert_eq!(m.reciprocity, Some(1.0));
    // a and b share no predecessors; c has none.
    assert_close(m.mean_cos_sim, 0.0, f64::EPSILON);
    // Largest SCC holds every edge: 2/2 - (2·2)/4 = 0.
    assert_close(m.modularity.expect("defined"), 0.0, 1e-12);

    // c is dangling: y = 0.05 / (1 - 0.85/3), x = (1 - y) / 2.
    let y = 0.05 / (1.0 - 0.85 / 3.0);
    let x = (1.0 - y) / 2.0;
    assert_close(m.pagerank_max, x, 1e-4);
    assert_close(m.pagerank_avg, 1.0 / 3.0, 1e-9);
}

// ---------------------------------------------------------------------------
// Star: hub → 4 leaves
// ---------------------------------------------------------------------------

#[test]
fn out_star() {
    let g = load(r#"[{"hub": ["l1", "l2", "l3", "l4"]}]"#);

    // 4 edges over 5·4 slots.
    assert_close(density(&g, 6), 0.2, 1e-12);

    let d = degree_one(&g);
    assert_eq!(d.count, 4);
    assert_close(d.fraction, 0.8, 1e-12);

    assert_eq!(reciprocity(&g), Some(0.0));

    let sccs = strong_components(&g);
    assert_eq!(sccs.len(), 5);
    // All singletons: the smallest identifier wins the tie.
    assert_eq!(sccs.largest().expect("non-empty").representative(), "hub");

    // Leaves share the hub as their only predecessor.
    let sim = cosine_similarity(&g, NeighborDirection::In);
    assert_close(sim.get("l1", "l2").expect("pair"), 1.0, 1e-12);
    assert_close(sim.get("hub", "l1").expect("pair"), 0.0, f64::EPSILON);
    // 4·3 ordered leaf pairs of 5·4.
    assert_close(sim.mean_off_diagonal(), 12.0 / 20.0, 1e-12);
    assert_close(mean_cosine_similarity(&g, NeighborDirection::In), 0.6, 1e-12);

    // Out-direction: only the hub has successors.
    assert_close(mean_cosine_similarity(&g, NeighborDirection::Out), 0.0, f64::EPSILON);
}

// ---------------------------------------------------------------------------
// A 3-cycle bridged into a 4-node SCC
// ---------------------------------------------------------------------------

#[test]
fn bridged_cycles() {
    let g = load(
        r#"[
            {"a": ["b"], "b": ["c"], "c": ["a"]},
            {"x": ["y"], "y": ["z", "w"], "z": ["x"], "w": ["x"]},
            {"c": ["a", "x"]}
        ]"#,
    );
    // Later "c" replaces the earlier list: c → a, c → x.
    assert!(g.contains_edge("c", "x"));
    assert_eq!(g.edge_count(), 9);

    let sccs = strong_components(&g);
    let largest = sccs.largest().expect("non-empty");
    assert_eq!(largest.members, vec!["w", "x", "y", "z"]);
    assert_eq!(sccs.components()[1].members, vec!["a", "b", "c"]);

    // Largest {w,x,y,z}: L = 5, K_out = 5, K_in = 6.
    // Rest {a,b,c}: L = 3, K_out = 4, K_in = 3.
    // Q = 5/9 - 30/81 + 3/9 - 12/81 = 30/81.
    let q = largest_component_modularity(&g, &sccs).expect("defined");
    assert_close(q, 30.0 / 81.0, 1e-12);
}

// ---------------------------------------------------------------------------
// PageRank on a directed cycle
// ---------------------------------------------------------------------------

#[test]
fn cycle_pagerank_is_uniform() {
    let g = load(r#"[{"n0": ["n1"], "n1": ["n2"], "n2": ["n3"], "n3": ["n0"]}]"#);
    let result = pagerank(&g, &PageRankConfig::default()).expect("converges");
    for score in result.scores.values() {
        assert_close(*score, 0.25, 1e-9);
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[test]
fn table_then_normalize() {
    let small = load(r#"[{"a": ["b"]}]"#);
    let medium = load(r#"[{"a": ["b"], "b": ["c"], "c": ["a"]}]"#);
    let large = load(r#"[{"a": ["b", "c", "d"], "b": ["a"], "c": ["a"], "d": []}]"#);

    let report = compute_table(
        &[("small", &small), ("medium", &medium), ("large", &large)],
        &MetricsSettings::default(),
    );
    assert!(report.is_complete());
    assert_eq!(report.table.columns(), COLUMNS.map(String::from).as_slice());
    assert_eq!(report.table.value("medium", "nodes"), Some(&Cell::Int(3)));
    assert_eq!(report.table.value("small", "reciprocity"), Some(&Cell::Float(0.0)));

    let normalized = z_normalize(&report.table, "nodes", &[]).expect("normalize");
    let order: Vec<&str> = normalized.rows().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, vec!["large", "medium", "small"]);

    // nodes 2, 3, 4: mean 3, sample std 1.
    assert_eq!(normalized.value("large", "nodes"), Some(&Cell::Float(1.0)));
    assert_eq!(normalized.value("small", "nodes"), Some(&Cell::Float(-1.0)));
}
