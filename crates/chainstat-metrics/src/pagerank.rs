//! PageRank by power iteration.
//!
//! # Algorithm
//!
//! ```text
//! PR(v) = (1 - d) / N + d * ( Σ PR(u) / out_degree(u)  for each u → v
//!                           + Σ PR(z) / N             for each dangling z )
//! ```
//!
//! where `d` is the damping factor (default 0.85) and dangling nodes (no
//! out-edges) spread their rank uniformly over all nodes.
//!
//! Iteration stops when the L1 change between successive rank vectors drops
//! below `N * tolerance`. If that does not happen within `max_iter`
//! iterations the computation fails with
//! [`MetricsError::NonConvergence`]; callers must surface it rather than
//! substitute a default.
//!
//! # Output
//!
//! [`PageRankResult`] carries the per-node scores (summing to 1) and the
//! iteration count; [`PageRankSummary`] reduces them to the `max` / `mean`
//! pair reported per graph.

use std::collections::HashMap;

use chainstat_core::{DirectedGraph, MetricsSettings};
use petgraph::Direction;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::MetricsError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for PageRank computation.
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Damping factor (probability of following a link vs teleporting).
    /// Default: 0.85.
    pub damping: f64,
    /// Per-node convergence threshold; the L1 stop criterion is
    /// `N * tolerance`. Default: 1e-6.
    pub tolerance: f64,
    /// Maximum number of iterations.
    /// Default: 100.
    pub max_iter: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iter: 100,
        }
    }
}

impl From<&MetricsSettings> for PageRankConfig {
    fn from(settings: &MetricsSettings) -> Self {
        Self {
            damping: settings.damping,
            tolerance: settings.tolerance,
            max_iter: settings.max_iter,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Result of a converged PageRank computation.
#[derive(Debug, Clone)]
pub struct PageRankResult {
    /// PageRank scores: node identifier → score.
    pub scores: HashMap<String, f64>,
    /// Number of iterations performed.
    pub iterations: usize,
}

/// Max and mean PageRank over all nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageRankSummary {
    pub max: f64,
    pub mean: f64,
}

impl PageRankSummary {
    /// Summarize a result. Both values are `0.0` for an empty graph.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_result(result: &PageRankResult) -> Self {
        if result.scores.is_empty() {
            return Self {
                max: 0.0,
                mean: 0.0,
            };
        }
        let max = result
            .scores
            .values()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let mean = result.scores.values().sum::<f64>() / result.scores.len() as f64;
        Self { max, mean }
    }
}

// ---------------------------------------------------------------------------
// PageRank
// ---------------------------------------------------------------------------

/// Compute PageRank over every node of `graph`.
///
/// # Errors
///
/// Returns [`MetricsError::NonConvergence`] if the rank vector has not
/// settled after `config.max_iter` iterations.
#[instrument(skip(graph, config), fields(nodes = graph.node_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn pagerank(
    graph: &DirectedGraph,
    config: &PageRankConfig,
) -> Result<PageRankResult, MetricsError> {
    let g = graph.graph();
    let n = g.node_count();

    if n == 0 {
        return Ok(PageRankResult {
            scores: HashMap::new(),
            iterations: 0,
        });
    }

    let n_f64 = n as f64;
    let base = (1.0 - config.damping) / n_f64;
    let threshold = n_f64 * config.tolerance;

    let successors: Vec<Vec<usize>> = g
        .node_indices()
        .map(|node| {
            g.neighbors_directed(node, Direction::Outgoing)
                .map(petgraph::graph::NodeIndex::index)
                .collect()
        })
        .collect();

    // Initialize ranks uniformly.
    let mut ranks = vec![1.0 / n_f64; n];
    let mut new_ranks = vec![0.0_f64; n];
    let mut delta = f64::INFINITY;

    for iteration in 1..=config.max_iter {
        let dangling: f64 = successors
            .iter()
            .zip(&ranks)
            .filter(|(succ, _)| succ.is_empty())
            .map(|(_, rank)| rank)
            .sum();

        // Reset to teleportation plus the uniform dangling share.
        new_ranks.fill(config.damping.mul_add(dangling / n_f64, base));

        // Distribute rank from each node to its outgoing neighbors.
        for (idx, succ) in successors.iter().enumerate() {
            if succ.is_empty() {
                continue;
            }
            let share = config.damping * ranks[idx] / succ.len() as f64;
            for &target in succ {
                new_ranks[target] += share;
            }
        }

        // Check convergence: L1 norm of delta.
        delta = ranks
            .iter()
            .zip(new_ranks.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        std::mem::swap(&mut ranks, &mut new_ranks);

        if delta < threshold {
            debug!(iterations = iteration, "PageRank converged");
            let scores = graph
                .node_ids()
                .zip(ranks.iter())
                .map(|(id, &rank)| (id.to_string(), rank))
                .collect();
            return Ok(PageRankResult {
                scores,
                iterations: iteration,
            });
        }
    }

    warn!(
        max_iter = config.max_iter,
        last_delta = delta,
        "PageRank failed to converge"
    );
    Err(MetricsError::NonConvergence {
        iterations: config.max_iter,
        last_delta: delta,
    })
}

/// Run PageRank and reduce it to a [`PageRankSummary`].
///
/// # Errors
///
/// Same as [`pagerank`].
pub fn pagerank_summary(
    graph: &DirectedGraph,
    config: &PageRankConfig,
) -> Result<PageRankSummary, MetricsError> {
    pagerank(graph, config).map(|result| PageRankSummary::from_result(&result))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
