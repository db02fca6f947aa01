//! Typed errors for loading graphs and groupings.

use std::path::PathBuf;

/// Errors raised while turning raw adjacency JSON into a [`DirectedGraph`].
///
/// A failure applies to a single input only; batch loaders record it and
/// continue with the remaining files.
///
/// [`DirectedGraph`]: crate::graph::DirectedGraph
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The source could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source is not a JSON array of `{identifier: [identifier, ...]}` objects.
    #[error("malformed adjacency data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The merged adjacency mapping cannot be represented as a graph.
    #[error("cannot construct graph: {reason}")]
    GraphConstruction { reason: String },
}

/// Errors raised while reading a category grouping.
#[derive(Debug, thiserror::Error)]
pub enum GroupingError {
    /// The grouping file could not be read from disk.
    #[error("failed to read grouping {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The grouping is not a JSON object of `category: [identifier, ...]`.
    #[error("malformed grouping: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_error_mentions_reason() {
        let err = LoadError::GraphConstruction {
            reason: "node count exceeds backend limit".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot construct graph: node count exceeds backend limit"
        );
    }

    #[test]
    fn malformed_wraps_serde_error() {
        let serde_err = serde_json::from_str::<Vec<String>>("{").expect_err("invalid json");
        let err = LoadError::from(serde_err);
        assert!(matches!(err, LoadError::Malformed(_)));
        assert!(err.to_string().starts_with("malformed adjacency data"));
    }
}
