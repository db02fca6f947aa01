//! Pairwise node cosine similarity.
//!
//! # Overview
//!
//! Two nodes are structurally similar when they share neighbors. Treating
//! each node's neighbor set as a 0/1 indicator vector, the cosine of the
//! angle between two such vectors is
//!
//! ```text
//! S[i][j] = |N(i) ∩ N(j)| / sqrt(|N(i)| · |N(j)|)
//! ```
//!
//! where `N` is the successor set (`Out`) or predecessor set (`In`). In
//! matrix form with adjacency `A`, the shared-neighbor counts are `A·Aᵀ`
//! (successors) or `Aᵀ·A` (predecessors).
//!
//! ## Degenerate Pairs
//!
//! A node with no neighbors in the chosen direction has similarity `0.0`
//! to every node. The diagonal is always `0.0`. Every entry lies in
//! `[0, 1]` and the matrix is symmetric.
//!
//! ## Graph-Level Score
//!
//! The graph score is the mean of all off-diagonal entries of the full
//! `n × n` matrix. [`mean_cosine_similarity`] computes it in `O(E + Σ deg²)`
//! without materializing the matrix, using
//!
//! ```text
//! Σ_{i≠j} S[i][j] = Σ_w [ (Σ_{i∈M(w)} 1/sqrt(d_i))² − Σ_{i∈M(w)} 1/d_i ]
//! ```
//!
//! where `M(w)` is the set of nodes that have `w` as a neighbor.

use std::collections::HashMap;

use chainstat_core::{DirectedGraph, NeighborDirection};
use nalgebra::DMatrix;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::instrument;

// ---------------------------------------------------------------------------
// SimilarityMatrix
// ---------------------------------------------------------------------------

/// Dense cosine-similarity matrix over a graph's node order.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    values: DMatrix<f64>,
    direction: NeighborDirection,
}

/// One off-diagonal entry of a [`SimilarityMatrix`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarPair {
    pub first: String,
    pub second: String,
    pub similarity: f64,
}

impl SimilarityMatrix {
    /// Number of nodes (rows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Which neighborhood the matrix was computed over.
    #[must_use]
    pub const fn direction(&self) -> NeighborDirection {
        self.direction
    }

    /// Node identifiers in row order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Borrow the raw matrix.
    #[must_use]
    pub const fn as_matrix(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Similarity by row/column position.
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[(row, col)]
    }

    /// Similarity between two identifiers, if both are nodes.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = *self.index.get(a)?;
        let j = *self.index.get(b)?;
        Some(self.values[(i, j)])
    }

    /// Mean of all off-diagonal entries (both orientations of each pair).
    ///
    /// `0.0` for graphs with fewer than two nodes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_off_diagonal(&self) -> f64 {
        let n = self.ids.len();
        if n < 2 {
            return 0.0;
        }
        // The diagonal is zero, so the full sum is the off-diagonal sum.
        self.values.sum() / (n * (n - 1)) as f64
    }

    /// The `k` most similar unordered pairs, highest first.
    ///
    /// Ties are ordered by identifier for stable output. Pairs with zero
    /// similarity are never returned.
    #[must_use]
    pub fn top_pairs(&self, k: usize) -> Vec<SimilarPair> {
        let n = self.ids.len();
        let mut pairs: Vec<(usize, usize, f64)> = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let s = self.values[(i, j)];
                if s > 0.0 {
                    pairs.push((i, j, s));
                }
            }
        }
        pairs.sort_by(|a, b| {
            b.2.total_cmp(&a.2)
                .then_with(|| self.ids[a.0].cmp(&self.ids[b.0]))
                .then_with(|| self.ids[a.1].cmp(&self.ids[b.1]))
        });
        pairs
            .into_iter()
            .take(k)
            .map(|(i, j, similarity)| SimilarPair {
                first: self.ids[i].clone(),
                second: self.ids[j].clone(),
                similarity,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the full cosine-similarity matrix of `graph`.
///
/// Memory is `O(n²)`; use [`mean_cosine_similarity`] when only the
/// graph-level score is needed.
#[must_use]
#[instrument(skip(graph), fields(nodes = graph.node_count()))]
pub fn cosine_similarity(graph: &DirectedGraph, direction: NeighborDirection) -> SimilarityMatrix {
    let n = graph.node_count();
    let ids: Vec<String> = graph.node_ids().map(str::to_string).collect();
    let index: HashMap<String, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), i))
        .collect();

    let mut adjacency = DMatrix::<f64>::zeros(n, n);
    for (source, target) in graph.edges() {
        adjacency[(source.index(), target.index())] = 1.0;
    }

    let common = match direction {
        NeighborDirection::Out => &adjacency * adjacency.transpose(),
        NeighborDirection::In => adjacency.transpose() * &adjacency,
    };

    let degrees: Vec<f64> = graph
        .graph()
        .node_indices()
        .map(|idx| degree_f64(graph.directed_degree(idx, direction)))
        .collect();

    let values = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            return 0.0;
        }
        let norm = (degrees[i] * degrees[j]).sqrt();
        if norm == 0.0 {
            0.0
        } else {
            (common[(i, j)] / norm).clamp(0.0, 1.0)
        }
    });

    SimilarityMatrix {
        ids,
        index,
        values,
        direction,
    }
}

/// Mean off-diagonal cosine similarity without building the matrix.
///
/// Equal (up to floating-point rounding) to
/// `cosine_similarity(graph, direction).mean_off_diagonal()`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_cosine_similarity(graph: &DirectedGraph, direction: NeighborDirection) -> f64 {
    let n = graph.node_count();
    if n < 2 {
        return 0.0;
    }

    let g = graph.graph();
    // A node `i` has `w` as a neighbor in `direction` exactly when `w` sees
    // `i` along the opposite direction.
    let members_of = direction.as_petgraph().opposite();

    let mut total = 0.0_f64;
    for w in g.node_indices() {
        let mut inv_sqrt_sum = 0.0_f64;
        let mut inv_sum = 0.0_f64;
        for edge in g.edges_directed(w, members_of) {
            let member = if edge.source() == w {
                edge.target()
            } else {
                edge.source()
            };
            let d = degree_f64(graph.directed_degree(member, direction));
            inv_sqrt_sum += 1.0 / d.sqrt();
            inv_sum += 1.0 / d;
        }
        total += inv_sqrt_sum.mul_add(inv_sqrt_sum, -inv_sum);
    }

    (total / (n * (n - 1)) as f64).clamp(0.0, 1.0)
}

#[allow(clippy::cast_precision_loss)]
fn degree_f64(d: usize) -> f64 {
    d as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
