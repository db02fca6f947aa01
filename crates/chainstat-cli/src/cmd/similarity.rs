//! `chainstat similarity`: cosine similarity of nodes within one graph.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use chainstat_core::graph::load_graph_file;
use chainstat_core::{MetricsSettings, NeighborDirection};
use chainstat_metrics::similarity::{SimilarPair, cosine_similarity};
use clap::Args;
use serde::Serialize;

use crate::output::{FLOAT_PRECISION, OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `chainstat similarity`.
#[derive(Args, Debug)]
pub struct SimilarityArgs {
    /// A single `<entity>.json` graph file.
    pub graph_file: PathBuf,

    /// Neighborhood to compare: `in` (predecessors) or `out` (successors).
    /// Defaults to the configured `similarity_direction`.
    #[arg(long, value_name = "in|out")]
    pub direction: Option<NeighborDirection>,

    /// Number of most similar pairs to list.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(Debug, Serialize)]
struct SimilarityOutput {
    graph: String,
    direction: NeighborDirection,
    nodes: usize,
    mean_cos_sim: f64,
    top_pairs: Vec<SimilarPair>,
}

/// Execute `chainstat similarity`.
pub fn run_similarity(
    args: &SimilarityArgs,
    settings: &MetricsSettings,
    output: OutputMode,
) -> anyhow::Result<()> {
    let (graph_name, graph) = load_graph_file(&args.graph_file)
        .with_context(|| format!("failed to load graph {}", args.graph_file.display()))?;
    let direction = args.direction.unwrap_or(settings.similarity_direction);

    let matrix = cosine_similarity(&graph, direction);
    let payload = SimilarityOutput {
        graph: graph_name,
        direction,
        nodes: matrix.len(),
        mean_cos_sim: matrix.mean_off_diagonal(),
        top_pairs: matrix.top_pairs(args.top),
    };
    render_mode(output, &payload, render_similarity_text, render_similarity_pretty)
}

fn render_similarity_text(payload: &SimilarityOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{:.prec$}",
        payload.graph,
        payload.direction,
        payload.nodes,
        payload.mean_cos_sim,
        prec = FLOAT_PRECISION
    )?;
    for pair in &payload.top_pairs {
        writeln!(
            w,
            "{}\t{}\t{:.prec$}",
            pair.first,
            pair.second,
            pair.similarity,
            prec = FLOAT_PRECISION
        )?;
    }
    Ok(())
}

fn render_similarity_pretty(payload: &SimilarityOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &payload.graph)?;
    pretty_kv(w, "direction", payload.direction.as_str(), 12)?;
    pretty_kv(w, "nodes", payload.nodes.to_string(), 12)?;
    pretty_kv(
        w,
        "mean_cos_sim",
        format!("{:.prec$}", payload.mean_cos_sim, prec = FLOAT_PRECISION),
        12,
    )?;
    if payload.top_pairs.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    pretty_section(w, "Most similar pairs")?;
    let width = payload
        .top_pairs
        .iter()
        .map(|pair| pair.first.len() + pair.second.len() + 3)
        .max()
        .unwrap_or(0);
    for pair in &payload.top_pairs {
        writeln!(
            w,
            "  {:<width$}  {:.prec$}",
            format!("{} ~ {}", pair.first, pair.second),
            pair.similarity,
            prec = FLOAT_PRECISION
        )?;
    }
    Ok(())
}
