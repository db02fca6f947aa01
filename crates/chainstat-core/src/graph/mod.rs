//! Directed interaction graphs.
//!
//! # Overview
//!
//! Each community is represented by one directed graph whose nodes are
//! opaque user identifiers and whose edges mean "source replied to /
//! pointed at target". Graphs are built once and never mutated afterward;
//! every metric takes `&DirectedGraph`.
//!
//! ## Pipeline
//!
//! ```text
//! [{"a": ["b","c"]}, {"b": ["a"]}, ...]      (one JSON file per community)
//!        ↓  load::parse_fragments()
//! Vec<Fragment>
//!        ↓  build::merge_fragments()
//! merged adjacency (later keys replace earlier neighbor lists)
//!        ↓  build::DirectedGraph::from_adjacency()
//! DirectedGraph
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use chainstat_core::graph::load::load_graph_dir;
//!
//! let report = load_graph_dir(Path::new("data/chain-networks"))?;
//! for failure in &report.failures {
//!     eprintln!("skipped {}: {}", failure.name, failure.error);
//! }
//! println!("loaded {} graphs", report.graphs.len());
//! ```

pub mod build;
pub mod load;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use build::{DirectedGraph, merge_fragments};
pub use load::{Fragment, LoadFailure, LoadReport, load_graph_dir, load_graph_file, parse_graph};

/// Which neighborhood of a node to look at.
///
/// `Out` follows edges away from the node (successors), `In` follows edges
/// into the node (predecessors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborDirection {
    /// Predecessors: nodes with an edge pointing at this node.
    #[default]
    In,
    /// Successors: nodes this node points at.
    Out,
}

impl NeighborDirection {
    /// The equivalent petgraph direction.
    #[must_use]
    pub const fn as_petgraph(self) -> petgraph::Direction {
        match self {
            Self::In => petgraph::Direction::Incoming,
            Self::Out => petgraph::Direction::Outgoing,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for NeighborDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is neither `in` nor `out`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown neighbor direction {0:?} (expected \"in\" or \"out\")")]
pub struct ParseDirectionError(pub String);

impl FromStr for NeighborDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "incoming" => Ok(Self::In),
            "out" | "outgoing" => Ok(Self::Out),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("IN".parse::<NeighborDirection>(), Ok(NeighborDirection::In));
        assert_eq!(
            "outgoing".parse::<NeighborDirection>(),
            Ok(NeighborDirection::Out)
        );
        assert!("sideways".parse::<NeighborDirection>().is_err());
    }

    #[test]
    fn direction_serializes_lowercase() {
        let json = serde_json::to_string(&NeighborDirection::Out).expect("serialize");
        assert_eq!(json, "\"out\"");
    }
}
