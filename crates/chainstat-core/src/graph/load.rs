//! JSON loading for per-community graph files.
//!
//! # File Format
//!
//! Each file holds one community's interaction graph as a JSON array of
//! objects mapping an identifier to the identifiers it points at:
//!
//! ```json
//! [{"user_a": ["user_b", "user_c"]}, {"user_b": ["user_a"]}]
//! ```
//!
//! The file stem is the community name. Objects are merged in order (see
//! [`crate::graph::build`] for the overwrite semantics).
//!
//! # Batch Loading
//!
//! [`load_graph_dir`] loads a whole directory. A file that fails to parse
//! or build is logged, recorded in [`LoadReport::failures`], and skipped;
//! the rest of the batch is unaffected.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use tracing::{debug, info, instrument, warn};

use crate::collection::GraphCollection;
use crate::error::LoadError;
use crate::graph::build::DirectedGraph;

// ---------------------------------------------------------------------------
// Fragment
// ---------------------------------------------------------------------------

/// One object of the input array, with key order preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// `(identifier, neighbors)` entries in the order they were written.
    pub entries: Vec<(String, Vec<String>)>,
}

impl<'de> Deserialize<'de> for Fragment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FragmentVisitor;

        impl<'de> Visitor<'de> for FragmentVisitor {
            type Value = Fragment;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping identifiers to arrays of identifiers")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, Vec<String>)> =
                    Vec::with_capacity(map.size_hint().unwrap_or(1));
                while let Some((key, neighbors)) = map.next_entry::<String, Vec<String>>()? {
                    // A repeated key inside one object behaves like a later fragment.
                    if let Some(existing) = entries.iter_mut().find(|(k, _)| *k == key) {
                        existing.1 = neighbors;
                    } else {
                        entries.push((key, neighbors));
                    }
                }
                Ok(Fragment { entries })
            }
        }

        deserializer.deserialize_map(FragmentVisitor)
    }
}

// ---------------------------------------------------------------------------
// Single inputs
// ---------------------------------------------------------------------------

/// Parse the raw JSON array into fragments without building a graph.
///
/// # Errors
///
/// Returns [`LoadError::Malformed`] if `json` is not an array of
/// identifier → identifier-array objects.
pub fn parse_fragments(json: &str) -> Result<Vec<Fragment>, LoadError> {
    Ok(serde_json::from_str::<Vec<Fragment>>(json)?)
}

/// Parse one graph from its JSON text.
///
/// # Errors
///
/// Returns [`LoadError::Malformed`] for unparseable input and
/// [`LoadError::GraphConstruction`] if the merged adjacency is invalid.
pub fn parse_graph(json: &str) -> Result<DirectedGraph, LoadError> {
    let fragments = parse_fragments(json)?;
    DirectedGraph::from_fragments(fragments)
}

/// Load one graph file; the returned name is the file stem.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, otherwise the
/// errors of [`parse_graph`].
#[instrument]
pub fn load_graph_file(path: &Path) -> Result<(String, DirectedGraph), LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let graph = parse_graph(&content)?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded graph"
    );
    Ok((entity_name(path), graph))
}

// ---------------------------------------------------------------------------
// Batch loading
// ---------------------------------------------------------------------------

/// A graph file that could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    /// Entity name (file stem).
    pub name: String,
    /// Path of the offending file.
    pub path: PathBuf,
    /// Why it failed.
    pub error: LoadError,
}

/// Outcome of loading a directory of graph files.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully loaded graphs keyed by entity name.
    pub graphs: GraphCollection,
    /// Files that were skipped, in file-name order.
    pub failures: Vec<LoadFailure>,
}

/// Load every `*.json` file in `dir`, in file-name order.
///
/// # Errors
///
/// Returns [`LoadError::Io`] only if the directory itself cannot be listed.
/// Per-file failures are collected in [`LoadReport::failures`].
#[instrument]
pub fn load_graph_dir(dir: &Path) -> Result<LoadReport, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut report = LoadReport::default();
    for path in paths {
        match load_graph_file(&path) {
            Ok((name, graph)) => report.graphs.insert(name, graph),
            Err(error) => {
                let name = entity_name(&path);
                warn!(entity = %name, path = %path.display(), %error, "skipping graph file");
                report.failures.push(LoadFailure { name, path, error });
            }
        }
    }

    info!(
        loaded = report.graphs.len(),
        skipped = report.failures.len(),
        "graph directory loaded"
    );
    Ok(report)
}

fn entity_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
