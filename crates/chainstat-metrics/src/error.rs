//! Errors raised by the metrics engine.
//!
//! Numeric degeneracies (zero-degree nodes, edgeless graphs) are not errors:
//! they resolve to documented `0.0` / `None` values at the metric itself.

/// Metric computation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    /// PageRank power iteration hit its iteration cap.
    #[error("PageRank did not converge within {iterations} iterations (last L1 change {last_delta:e})")]
    NonConvergence { iterations: usize, last_delta: f64 },

    /// A resampled null distribution has the wrong number of samples.
    #[error("resampled distribution has {actual} samples, expected {expected}")]
    ResampleSize { expected: usize, actual: usize },

    /// A table operation referenced a column that does not exist.
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}
