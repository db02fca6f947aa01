//! Basic structural statistics: density, degree facts, reciprocity.
//!
//! # Statistics Provided
//!
//! - **density**: `edges / (nodes * (nodes - 1))`, rounded to a fixed number
//!   of decimals so values compare and store stably. Zero for graphs with
//!   fewer than two nodes.
//! - **degree-one nodes**: nodes whose combined in + out degree is exactly 1,
//!   i.e. users that took part in a single interaction.
//! - **degree distribution**: per-node in- and out-degree lists.
//! - **reciprocity**: fraction of edges `u → v` whose reverse `v → u` also
//!   exists. Undefined (`None`) for an edgeless graph.
//!
//! All functions take the graph by shared reference and never mutate it.

use chainstat_core::DirectedGraph;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Density
// ---------------------------------------------------------------------------

/// Directed density rounded to `decimals` decimal places.
#[must_use]
pub fn density(graph: &DirectedGraph, decimals: u32) -> f64 {
    round_to(raw_density(graph.node_count(), graph.edge_count()), decimals)
}

#[allow(clippy::cast_precision_loss)]
fn raw_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (node_count * (node_count - 1)) as f64;
    edge_count as f64 / max_edges
}

/// Round half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = i32::try_from(decimals).unwrap_or(i32::MAX).min(15);
    let scale = 10_f64.powi(exponent);
    (value * scale).round() / scale
}

// ---------------------------------------------------------------------------
// Degree facts
// ---------------------------------------------------------------------------

/// Count and share of nodes with combined degree exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DegreeOne {
    pub count: usize,
    /// `count / nodes`; `0.0` for an empty graph.
    pub fraction: f64,
}

/// Count nodes whose in-degree plus out-degree equals one.
///
/// A self-loop contributes two to its node's combined degree.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn degree_one(graph: &DirectedGraph) -> DegreeOne {
    let count = graph
        .graph()
        .node_indices()
        .filter(|&idx| graph.total_degree(idx) == 1)
        .count();
    let n = graph.node_count();
    let fraction = if n == 0 {
        0.0
    } else {
        count as f64 / n as f64
    };
    DegreeOne { count, fraction }
}

/// In- and out-degree of every node, in node order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegreeDistribution {
    pub in_degrees: Vec<usize>,
    pub out_degrees: Vec<usize>,
}

impl DegreeDistribution {
    /// Highest in-degree, `0` for an empty graph.
    #[must_use]
    pub fn max_in(&self) -> usize {
        self.in_degrees.iter().copied().max().unwrap_or(0)
    }

    /// Highest out-degree, `0` for an empty graph.
    #[must_use]
    pub fn max_out(&self) -> usize {
        self.out_degrees.iter().copied().max().unwrap_or(0)
    }
}

#[must_use]
pub fn degree_distribution(graph: &DirectedGraph) -> DegreeDistribution {
    let g = graph.graph();
    DegreeDistribution {
        in_degrees: g.node_indices().map(|idx| graph.in_degree(idx)).collect(),
        out_degrees: g.node_indices().map(|idx| graph.out_degree(idx)).collect(),
    }
}

// ---------------------------------------------------------------------------
// Reciprocity
// ---------------------------------------------------------------------------

/// Fraction of edges that are reciprocated.
///
/// An edge `u → v` (with `u != v`) is reciprocated when `v → u` exists.
/// Self-loops count toward the total but are never reciprocated. Returns
/// `None` when the graph has no edges.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn reciprocity(graph: &DirectedGraph) -> Option<f64> {
    let total = graph.edge_count();
    if total == 0 {
        return None;
    }
    let g = graph.graph();
    let reciprocated = graph
        .edges()
        .filter(|&(source, target)| source != target && g.contains_edge(target, source))
        .count();
    Some(reciprocated as f64 / total as f64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
