//! Per-graph metric bundle and per-collection tables.
//!
//! [`compute_graph_metrics`] runs every metric over one graph and returns a
//! [`GraphMetrics`] row. [`compute_table`] does that for a set of named
//! graphs in parallel and assembles a [`MetricsTable`]; graphs whose metrics
//! fail (PageRank non-convergence) are reported in
//! [`TableReport::failures`] instead of appearing as rows.

use std::collections::BTreeMap;

use chainstat_core::{DirectedGraph, GraphCollection, Grouping, MetricsSettings};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::components::{containment, largest_component_modularity, strong_components};
use crate::error::MetricsError;
use crate::pagerank::{PageRankConfig, pagerank_summary};
use crate::similarity::mean_cosine_similarity;
use crate::structure::{degree_one, density, reciprocity};
use crate::table::{Cell, MetricsTable};

/// Column names of a metrics table, in order.
pub const COLUMNS: [&str; 12] = [
    "nodes",
    "edges",
    "density",
    "nodes_largest_strong_comp",
    "pct_nodes_largest_strong_comp",
    "nodes_deg_one",
    "pct_nodes_deg_one",
    "pagerank_max",
    "pagerank_avg",
    "reciprocity",
    "mean_cos_sim",
    "modularity",
];

/// The fixed metric bundle of one graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphMetrics {
    pub nodes: usize,
    pub edges: usize,
    /// Rounded directed density.
    pub density: f64,
    pub nodes_largest_strong_comp: usize,
    pub pct_nodes_largest_strong_comp: f64,
    pub nodes_deg_one: usize,
    pub pct_nodes_deg_one: f64,
    pub pagerank_max: f64,
    pub pagerank_avg: f64,
    /// `None` for an edgeless graph.
    pub reciprocity: Option<f64>,
    pub mean_cos_sim: f64,
    /// `None` for an edgeless graph.
    pub modularity: Option<f64>,
}

impl GraphMetrics {
    /// Cells in [`COLUMNS`] order.
    #[must_use]
    pub fn to_cells(&self) -> Vec<Cell> {
        vec![
            Cell::count(self.nodes),
            Cell::count(self.edges),
            Cell::Float(self.density),
            Cell::count(self.nodes_largest_strong_comp),
            Cell::Float(self.pct_nodes_largest_strong_comp),
            Cell::count(self.nodes_deg_one),
            Cell::Float(self.pct_nodes_deg_one),
            Cell::Float(self.pagerank_max),
            Cell::Float(self.pagerank_avg),
            Cell::optional(self.reciprocity),
            Cell::Float(self.mean_cos_sim),
            Cell::optional(self.modularity),
        ]
    }
}

/// Compute the full metric bundle for one graph.
///
/// # Errors
///
/// Returns [`MetricsError::NonConvergence`] if PageRank does not converge.
#[instrument(skip(graph, settings), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn compute_graph_metrics(
    graph: &DirectedGraph,
    settings: &MetricsSettings,
) -> Result<GraphMetrics, MetricsError> {
    let pagerank = pagerank_summary(graph, &PageRankConfig::from(settings))?;

    let components = strong_components(graph);
    let largest = containment(graph, &components);
    let deg_one = degree_one(graph);

    Ok(GraphMetrics {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        density: density(graph, settings.density_decimals),
        nodes_largest_strong_comp: largest.nodes,
        pct_nodes_largest_strong_comp: largest.fraction,
        nodes_deg_one: deg_one.count,
        pct_nodes_deg_one: deg_one.fraction,
        pagerank_max: pagerank.max,
        pagerank_avg: pagerank.mean,
        reciprocity: reciprocity(graph),
        mean_cos_sim: mean_cosine_similarity(graph, settings.similarity_direction),
        modularity: largest_component_modularity(graph, &components),
    })
}

/// A metrics table plus the graphs that could not be measured.
#[derive(Debug, Clone, PartialEq)]
pub struct TableReport {
    pub table: MetricsTable,
    pub failures: Vec<(String, MetricsError)>,
}

impl TableReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Compute one row per graph, in the order given.
///
/// Graphs are measured in parallel; the table keeps the input order.
#[must_use]
#[instrument(skip_all, fields(graphs = graphs.len()))]
pub fn compute_table(graphs: &[(&str, &DirectedGraph)], settings: &MetricsSettings) -> TableReport {
    let results: Vec<(&str, Result<GraphMetrics, MetricsError>)> = graphs
        .par_iter()
        .map(|&(name, graph)| (name, compute_graph_metrics(graph, settings)))
        .collect();

    let mut table = MetricsTable::new(COLUMNS);
    let mut failures = Vec::new();
    for (name, result) in results {
        match result {
            Ok(metrics) => {
                debug!(graph = name, "computed metrics");
                table.push_row(name, metrics.to_cells());
            }
            Err(err) => {
                warn!(graph = name, error = %err, "skipping graph");
                failures.push((name.to_string(), err));
            }
        }
    }

    info!(rows = table.len(), failed = failures.len(), "metrics table complete");
    TableReport { table, failures }
}

/// One table per category of `grouping`, built from the graphs of its
/// members that exist in `collection`.
#[must_use]
pub fn compute_group_tables(
    collection: &GraphCollection,
    grouping: &Grouping,
    settings: &MetricsSettings,
) -> BTreeMap<String, TableReport> {
    collection
        .select_groups(grouping)
        .into_iter()
        .map(|(group, selection)| {
            if !selection.missing.is_empty() {
                warn!(
                    group = group.as_str(),
                    missing = ?selection.missing,
                    "group members without a loaded graph"
                );
            }
            let report = compute_table(&selection.entries, settings);
            (group, report)
        })
        .collect()
}
