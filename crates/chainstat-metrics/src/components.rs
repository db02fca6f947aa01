//! Strongly connected component analysis.
//!
//! # Overview
//!
//! Nodes `u` and `v` share a strongly connected component (SCC) when each
//! can reach the other along directed edges. The SCCs partition the node
//! set. This module provides:
//!
//! 1. **Decomposition**: Tarjan's algorithm via [`petgraph::algo::tarjan_scc`].
//! 2. **Containment**: how many nodes (and what share) sit in the largest
//!    SCC.
//! 3. **Size distribution**: component size → number of components, per
//!    graph or across a collection.
//! 4. **Modularity**: directed modularity of the two-way partition
//!    {largest SCC, everything else}: a positive value means the largest
//!    SCC is more densely self-connected than random mixing would give.
//!
//! ## Ordering
//!
//! Members of each component are sorted. Components are sorted by
//! descending size; equal sizes are ordered by their lexicographically
//! smallest member, so the "largest" component is deterministic.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashSet};

use chainstat_core::DirectedGraph;
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::instrument;

// ---------------------------------------------------------------------------
// StrongComponents
// ---------------------------------------------------------------------------

/// One strongly connected component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrongComponent {
    /// Node identifiers, sorted.
    pub members: Vec<String>,
}

impl StrongComponent {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Lexicographically smallest member.
    #[must_use]
    pub fn representative(&self) -> &str {
        self.members
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.members
            .binary_search_by(|member| member.as_str().cmp(id))
            .is_ok()
    }
}

/// The SCC partition of one graph, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrongComponents {
    components: Vec<StrongComponent>,
}

impl StrongComponents {
    /// All components, sorted largest first.
    #[must_use]
    pub fn components(&self) -> &[StrongComponent] {
        &self.components
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The largest component, `None` for an empty graph.
    #[must_use]
    pub fn largest(&self) -> Option<&StrongComponent> {
        self.components.first()
    }

    /// Component size → number of components of that size.
    #[must_use]
    pub fn size_distribution(&self) -> BTreeMap<usize, usize> {
        let mut distribution = BTreeMap::new();
        for component in &self.components {
            *distribution.entry(component.len()).or_insert(0) += 1;
        }
        distribution
    }

    /// Number of components with more than one member.
    #[must_use]
    pub fn cyclic_count(&self) -> usize {
        self.components.iter().filter(|c| c.len() > 1).count()
    }
}

/// Decompose `graph` into strongly connected components.
#[must_use]
#[instrument(skip(graph), fields(nodes = graph.node_count()))]
pub fn strong_components(graph: &DirectedGraph) -> StrongComponents {
    let g = graph.graph();
    let mut components: Vec<StrongComponent> = tarjan_scc(g)
        .into_iter()
        .map(|scc| {
            let mut members: Vec<String> = scc.into_iter().map(|idx| g[idx].clone()).collect();
            members.sort_unstable();
            StrongComponent { members }
        })
        .collect();

    components.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a.representative().cmp(b.representative()))
    });

    StrongComponents { components }
}

// ---------------------------------------------------------------------------
// Containment
// ---------------------------------------------------------------------------

/// Size and node share of the largest SCC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Containment {
    pub nodes: usize,
    /// `nodes / total nodes`; in `(0, 1]` for non-empty graphs, `0.0` otherwise.
    pub fraction: f64,
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn containment(graph: &DirectedGraph, components: &StrongComponents) -> Containment {
    let total = graph.node_count();
    let nodes = components.largest().map_or(0, StrongComponent::len);
    let fraction = if total == 0 {
        0.0
    } else {
        nodes as f64 / total as f64
    };
    Containment { nodes, fraction }
}

// ---------------------------------------------------------------------------
// Size distribution across a collection
// ---------------------------------------------------------------------------

/// Per-graph SCC size distributions for a set of named graphs.
#[must_use]
pub fn collection_size_distribution<'a, I>(graphs: I) -> BTreeMap<String, BTreeMap<usize, usize>>
where
    I: IntoIterator<Item = (&'a str, &'a DirectedGraph)>,
{
    graphs
        .into_iter()
        .map(|(name, graph)| (name.to_string(), strong_components(graph).size_distribution()))
        .collect()
}

// ---------------------------------------------------------------------------
// Modularity
// ---------------------------------------------------------------------------

/// Directed modularity of the {largest SCC, rest} partition.
///
/// ```text
/// Q = Σ_c [ L_c / m − (K_c^out · K_c^in) / m² ]
/// ```
///
/// `L_c` counts edges with both endpoints in community `c`; `K_c^out` and
/// `K_c^in` sum the out- and in-degrees of its members; `m` is the edge
/// count. Returns `None` for an edgeless graph, where modularity is
/// undefined.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn largest_component_modularity(
    graph: &DirectedGraph,
    components: &StrongComponents,
) -> Option<f64> {
    let m = graph.edge_count();
    if m == 0 {
        return None;
    }
    let largest = components.largest()?;
    let g = graph.graph();

    let in_largest: HashSet<NodeIndex> = largest
        .members
        .iter()
        .filter_map(|id| graph.node_index(id))
        .collect();

    // Index 0: largest SCC, index 1: rest.
    let mut internal = [0usize; 2];
    let mut out_sum = [0usize; 2];
    let mut in_sum = [0usize; 2];

    for idx in g.node_indices() {
        let side = usize::from(!in_largest.contains(&idx));
        out_sum[side] += graph.out_degree(idx);
        in_sum[side] += graph.in_degree(idx);
    }
    for (source, target) in graph.edges() {
        let source_side = in_largest.contains(&source);
        if source_side == in_largest.contains(&target) {
            internal[usize::from(!source_side)] += 1;
        }
    }

    let m_f64 = m as f64;
    let q = (0..2)
        .map(|c| {
            internal[c] as f64 / m_f64 - (out_sum[c] as f64 * in_sum[c] as f64) / (m_f64 * m_f64)
        })
        .sum();
    Some(q)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
