pub mod components;
pub mod correct;
pub mod metrics;
pub mod pvalue;
pub mod reconcile;
pub mod similarity;

use std::path::Path;

use anyhow::Context;
use chainstat_core::graph::{LoadReport, load_graph_dir};
use chainstat_core::Grouping;
use serde::Serialize;

/// A graph file the loader skipped, as reported to the user.
#[derive(Debug, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub path: String,
    pub error: String,
}

/// Load a graph directory, converting per-file failures for output.
pub fn load_dir(dir: &Path) -> anyhow::Result<(LoadReport, Vec<SkippedFile>)> {
    let report = load_graph_dir(dir)
        .with_context(|| format!("failed to load graphs from {}", dir.display()))?;
    let skipped = report
        .failures
        .iter()
        .map(|failure| SkippedFile {
            name: failure.name.clone(),
            path: failure.path.display().to_string(),
            error: failure.error.to_string(),
        })
        .collect();
    Ok((report, skipped))
}

/// Read a grouping file with path context.
pub fn load_grouping(path: &Path) -> anyhow::Result<Grouping> {
    Grouping::load(path).with_context(|| format!("failed to read grouping {}", path.display()))
}
