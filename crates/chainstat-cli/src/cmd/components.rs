//! `chainstat components`: strongly connected component sizes per graph.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use chainstat_core::DirectedGraph;
use chainstat_metrics::components::collection_size_distribution;
use clap::Args;
use serde::Serialize;

use crate::cmd::{SkippedFile, load_dir};
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `chainstat components`.
#[derive(Args, Debug, Default)]
pub struct ComponentsArgs {
    /// Directory of `<entity>.json` graph files.
    pub graph_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct GraphComponents {
    graph: String,
    /// Content hash of the loaded graph.
    snapshot: String,
    nodes: usize,
    components: usize,
    largest: usize,
    /// Component size → number of components.
    sizes: BTreeMap<usize, usize>,
}

#[derive(Debug, Serialize)]
struct ComponentsOutput {
    graphs: Vec<GraphComponents>,
    skipped: Vec<SkippedFile>,
}

/// Execute `chainstat components`.
pub fn run_components(args: &ComponentsArgs, output: OutputMode) -> anyhow::Result<()> {
    let (report, skipped) = load_dir(&args.graph_dir)?;
    let collection = &report.graphs;

    let graphs = collection_size_distribution(collection.iter())
        .into_iter()
        .map(|(graph, sizes)| {
            let loaded = collection.get(&graph);
            GraphComponents {
                snapshot: loaded.map(|g| g.content_hash().to_string()).unwrap_or_default(),
                nodes: loaded.map_or(0, DirectedGraph::node_count),
                components: sizes.values().sum(),
                largest: sizes.keys().next_back().copied().unwrap_or(0),
                graph,
                sizes,
            }
        })
        .collect();

    let payload = ComponentsOutput { graphs, skipped };
    render_mode(output, &payload, render_components_text, render_components_pretty)
}

fn render_components_text(payload: &ComponentsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "graph\tnodes\tcomponents\tlargest\tsizes")?;
    for g in &payload.graphs {
        let sizes: Vec<String> = g
            .sizes
            .iter()
            .map(|(size, count)| format!("{size}x{count}"))
            .collect();
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            g.graph,
            g.nodes,
            g.components,
            g.largest,
            sizes.join(",")
        )?;
    }
    for skipped in &payload.skipped {
        writeln!(w, "! {}\t{}", skipped.path, skipped.error)?;
    }
    Ok(())
}

fn render_components_pretty(
    payload: &ComponentsOutput,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if payload.graphs.is_empty() {
        writeln!(w, "No graphs loaded.")?;
    }
    for g in &payload.graphs {
        pretty_section(w, &g.graph)?;
        writeln!(
            w,
            "{} nodes in {} components; largest holds {}",
            g.nodes, g.components, g.largest
        )?;
        for (size, count) in g.sizes.iter().rev() {
            writeln!(w, "  size {size:>6}: {count}")?;
        }
        writeln!(w)?;
    }
    if !payload.skipped.is_empty() {
        pretty_section(w, "Skipped files")?;
        for skipped in &payload.skipped {
            writeln!(w, "  {}: {}", skipped.path, skipped.error)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ComponentsOutput {
        ComponentsOutput {
            graphs: vec![GraphComponents {
                graph: "science".into(),
                snapshot: "blake3:00".into(),
                nodes: 3,
                components: 2,
                largest: 2,
                sizes: BTreeMap::from([(1, 1), (2, 1)]),
            }],
            skipped: Vec::new(),
        }
    }

    #[test]
    fn text_lists_size_counts() {
        let mut out = Vec::new();
        render_components_text(&payload(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("science\t3\t2\t2\t1x1,2x1"));
    }

    #[test]
    fn pretty_lists_largest_first() {
        let mut out = Vec::new();
        render_components_pretty(&payload(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        let two = rendered.find("size      2").expect("size 2 line");
        let one = rendered.find("size      1").expect("size 1 line");
        assert!(two < one);
    }
}
