//! Graph construction from a merged adjacency mapping.
//!
//! # Overview
//!
//! The raw per-community data is a list of single-key objects
//! (`identifier → identifiers it points at`). This module merges those
//! fragments into one adjacency mapping and builds a [`petgraph`] directed
//! graph over it.
//!
//! ## Merge Semantics
//!
//! When the same key appears in several fragments, the later neighbor list
//! **replaces** the earlier one entirely; lists are never unioned. Data that
//! was split across fragments for one key is therefore lost except for the
//! last fragment.
//!
//! ## Node Order
//!
//! Nodes are inserted keys-first (in merged key order), followed by
//! identifiers that only ever appear as neighbors (in first-seen order).
//! This order is the row/column order of every matrix computed from the
//! graph.
//!
//! ## Content Hash
//!
//! [`DirectedGraph::content_hash`] is a BLAKE3 hash of the sorted edge list
//! plus the sorted node list, so two snapshots with the same structure hash
//! identically regardless of input order.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::instrument;

use crate::error::LoadError;
use crate::graph::NeighborDirection;
use crate::graph::load::Fragment;

/// Largest node count petgraph's default `u32` index can address.
const MAX_NODES: usize = u32::MAX as usize - 1;

// ---------------------------------------------------------------------------
// DirectedGraph
// ---------------------------------------------------------------------------

/// An immutable directed interaction graph.
///
/// Nodes are identifier strings; an edge `A → B` means A pointed at B.
/// There are no parallel edges. Self-loops are kept.
#[derive(Debug, Clone)]
pub struct DirectedGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    content_hash: String,
}

impl DirectedGraph {
    /// Build a graph from `(identifier, neighbors)` entries.
    ///
    /// Entries are taken as an already-merged mapping: if a key repeats, the
    /// later neighbor list replaces the earlier one (see module docs).
    /// Duplicate neighbors within one list collapse to a single edge.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::GraphConstruction`] if the node count exceeds what
    /// the graph backend can index.
    #[instrument(skip(entries))]
    pub fn from_adjacency<I, K, V, N>(entries: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let fragment = Fragment {
            entries: entries
                .into_iter()
                .map(|(key, neighbors)| {
                    (key.into(), neighbors.into_iter().map(Into::into).collect())
                })
                .collect(),
        };
        Self::from_merged(merge_fragments([fragment]))
    }

    /// Build a graph from loader fragments, merging them first.
    ///
    /// # Errors
    ///
    /// Same as [`DirectedGraph::from_adjacency`].
    pub fn from_fragments<I>(fragments: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = Fragment>,
    {
        Self::from_merged(merge_fragments(fragments))
    }

    fn from_merged(adjacency: Vec<(String, Vec<String>)>) -> Result<Self, LoadError> {
        let mut graph = DiGraph::<String, ()>::new();
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(adjacency.len());

        // Step 1: keys become nodes in merged order.
        for (key, _) in &adjacency {
            insert_node(&mut graph, &mut node_map, key)?;
        }

        // Step 2: neighbors become nodes (if new) and edges.
        let mut seen_edges: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
        for (key, neighbors) in &adjacency {
            let source = node_map[key];
            for neighbor in neighbors {
                let target = insert_node(&mut graph, &mut node_map, neighbor)?;
                if seen_edges.insert((source, target)) {
                    graph.add_edge(source, target, ());
                }
            }
        }

        let content_hash = compute_content_hash(&graph);

        Ok(Self {
            graph,
            node_map,
            content_hash,
        })
    }

    /// Return the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges (self-loops included).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Return `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Borrow the underlying petgraph graph.
    #[must_use]
    pub const fn graph(&self) -> &DiGraph<String, ()> {
        &self.graph
    }

    /// BLAKE3 content hash (`blake3:<hex>`) of the node and edge sets.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Look up the `NodeIndex` for an identifier.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Return the identifier of a node.
    #[must_use]
    pub fn node_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// Iterate node identifiers in node order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    /// Iterate edges as `(source, target)` node indices.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target()))
    }

    /// Return `true` if the edge `source → target` exists.
    #[must_use]
    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        match (self.node_index(source), self.node_index(target)) {
            (Some(a), Some(b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Number of edges leaving `idx` (a self-loop counts once).
    #[must_use]
    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    /// Number of edges entering `idx` (a self-loop counts once).
    #[must_use]
    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    /// Degree of `idx` in the given direction.
    #[must_use]
    pub fn directed_degree(&self, idx: NodeIndex, direction: NeighborDirection) -> usize {
        match direction {
            NeighborDirection::In => self.in_degree(idx),
            NeighborDirection::Out => self.out_degree(idx),
        }
    }

    /// Combined in + out degree (a self-loop counts twice).
    #[must_use]
    pub fn total_degree(&self, idx: NodeIndex) -> usize {
        self.in_degree(idx) + self.out_degree(idx)
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge fragments into one adjacency mapping.
///
/// Keys keep the position of their first appearance; a later occurrence of
/// a key replaces its neighbor list wholesale.
#[must_use]
pub fn merge_fragments<I>(fragments: I) -> Vec<(String, Vec<String>)>
where
    I: IntoIterator<Item = Fragment>,
{
    let mut merged: Vec<(String, Vec<String>)> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for fragment in fragments {
        for (key, neighbors) in fragment.entries {
            if let Some(&slot) = position.get(&key) {
                merged[slot].1 = neighbors;
            } else {
                position.insert(key.clone(), merged.len());
                merged.push((key, neighbors));
            }
        }
    }

    merged
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn insert_node(
    graph: &mut DiGraph<String, ()>,
    node_map: &mut HashMap<String, NodeIndex>,
    id: &str,
) -> Result<NodeIndex, LoadError> {
    if let Some(&idx) = node_map.get(id) {
        return Ok(idx);
    }
    if graph.node_count() >= MAX_NODES {
        return Err(LoadError::GraphConstruction {
            reason: format!("node count exceeds backend limit of {MAX_NODES}"),
        });
    }
    let idx = graph.add_node(id.to_string());
    node_map.insert(id.to_string(), idx);
    Ok(idx)
}

fn compute_content_hash(graph: &DiGraph<String, ()>) -> String {
    let mut nodes: Vec<&str> = graph.node_weights().map(String::as_str).collect();
    nodes.sort_unstable();

    let mut edges: Vec<(&str, &str)> = graph
        .edge_references()
        .map(|edge| (graph[edge.source()].as_str(), graph[edge.target()].as_str()))
        .collect();
    edges.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for node in nodes {
        hasher.update(node.as_bytes());
        hasher.update(b"\x00");
    }
    hasher.update(b"\x01");
    for (source, target) in edges {
        hasher.update(source.as_bytes());
        hasher.update(b"\x00");
        hasher.update(target.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(entries: &[(&str, &[&str])]) -> Fragment {
        Fragment {
            entries: entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.iter().map(|s| (*s).to_string()).collect()))
                .collect(),
        }
    }

    #[test]
    fn empty_adjacency_produces_empty_graph() {
        let graph = DirectedGraph::from_adjacency(Vec::<(String, Vec<String>)>::new())
            .expect("build graph");
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.is_empty());
        assert!(graph.content_hash().starts_with("blake3:"));
    }

    #[test]
    fn node_set_is_union_of_keys_and_values() {
        let graph = DirectedGraph::from_adjacency([("a", vec!["b", "c"]), ("d", vec![])])
            .expect("build graph");
        let mut ids: Vec<&str> = graph.node_ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn keys_are_inserted_before_neighbor_only_nodes() {
        let graph = DirectedGraph::from_adjacency([("x", vec!["z"]), ("y", vec!["x"])])
            .expect("build graph");
        let ids: Vec<&str> = graph.node_ids().collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn duplicate_neighbors_collapse_to_one_edge() {
        let graph =
            DirectedGraph::from_adjacency([("a", vec!["b", "b", "b"])]).expect("build graph");
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn self_loops_are_kept_and_count_both_ways() {
        let graph = DirectedGraph::from_adjacency([("a", vec!["a", "b"])]).expect("build graph");
        let a = graph.node_index("a").expect("a node");
        assert!(graph.contains_edge("a", "a"));
        assert_eq!(graph.out_degree(a), 2);
        assert_eq!(graph.in_degree(a), 1);
        assert_eq!(graph.total_degree(a), 3);
    }

    #[test]
    fn edge_direction_is_key_to_neighbor() {
        let graph = DirectedGraph::from_adjacency([("a", vec!["b"])]).expect("build graph");
        assert!(graph.contains_edge("a", "b"));
        assert!(!graph.contains_edge("b", "a"));
        assert!(!graph.contains_edge("a", "missing"));
    }

    #[test]
    fn later_fragment_replaces_neighbor_list() {
        let merged = merge_fragments([
            fragment(&[("a", &["b", "c"])]),
            fragment(&[("b", &["a"])]),
            fragment(&[("a", &["d"])]),
        ]);
        assert_eq!(
            merged,
            vec![
                ("a".to_string(), vec!["d".to_string()]),
                ("b".to_string(), vec!["a".to_string()]),
            ]
        );

        let graph = DirectedGraph::from_fragments([
            fragment(&[("a", &["b", "c"])]),
            fragment(&[("a", &["d"])]),
        ])
        .expect("build graph");
        // "b" and "c" only appeared in the replaced list.
        assert_eq!(graph.node_count(), 2);
        assert!(graph.contains_edge("a", "d"));
        assert!(graph.node_index("b").is_none());
    }

    #[test]
    fn empty_identifier_is_an_ordinary_node() {
        let graph = DirectedGraph::from_adjacency([("a", vec![""]), ("", vec!["a"])])
            .expect("build graph");
        assert_eq!(graph.node_count(), 2);
        assert!(graph.contains_edge("a", ""));
        assert!(graph.contains_edge("", "a"));
    }

    #[test]
    fn content_hash_ignores_input_order() {
        let first = DirectedGraph::from_adjacency([("a", vec!["b"]), ("b", vec!["c"])])
            .expect("build graph");
        let second = DirectedGraph::from_adjacency([("b", vec!["c"]), ("a", vec!["b"])])
            .expect("build graph");
        assert_eq!(first.content_hash(), second.content_hash());
    }

    #[test]
    fn content_hash_changes_with_edges() {
        let without =
            DirectedGraph::from_adjacency([("a", Vec::<&str>::new()), ("b", Vec::new())])
                .expect("build graph");
        let with = DirectedGraph::from_adjacency([("a", vec!["b"]), ("b", Vec::new())])
            .expect("build graph");
        assert_ne!(without.content_hash(), with.content_hash());
    }
}
