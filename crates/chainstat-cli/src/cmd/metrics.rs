//! `chainstat metrics`: per-graph metric tables, optionally per group.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chainstat_core::ProjectConfig;
use chainstat_metrics::{
    MetricsTable, TableReport, column_p_values, compute_group_tables, compute_table, z_normalize,
};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::cmd::{SkippedFile, load_dir, load_grouping};
use crate::output::{
    OutputMode, pretty_kv, pretty_section, render_mode, write_table_pretty, write_table_text,
};

/// Name of the single table produced without `--groups`.
const ALL_GROUP: &str = "all";

/// Arguments for `chainstat metrics`.
#[derive(Args, Debug, Default)]
pub struct MetricsArgs {
    /// Directory of `<entity>.json` graph files.
    pub graph_dir: PathBuf,

    /// Grouping file (group name → entity names); one table per group.
    #[arg(long, value_name = "FILE")]
    pub groups: Option<PathBuf>,

    /// Rank rows by this column, descending.
    #[arg(long, value_name = "COLUMN")]
    pub sort_by: Option<String>,

    /// Z-score numeric columns within each table.
    #[arg(long)]
    pub normalize: bool,

    /// Columns left untouched by `--normalize`.
    #[arg(long, value_name = "COLUMN")]
    pub exclude: Vec<String>,

    /// Null distributions (entity name → 1000 resampled values) for p-values.
    #[arg(long, value_name = "FILE", requires = "p_column")]
    pub samples: Option<PathBuf>,

    /// Column tested against `--samples`.
    #[arg(long, value_name = "COLUMN", requires = "samples")]
    pub p_column: Option<String>,
}

#[derive(Debug, Serialize)]
struct GraphFailure {
    graph: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct GroupTable {
    group: String,
    table: MetricsTable,
    failures: Vec<GraphFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    p_values: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Serialize)]
struct MetricsOutput {
    tables: Vec<GroupTable>,
    /// Graph name → content hash of the snapshot measured.
    snapshots: BTreeMap<String, String>,
    skipped: Vec<SkippedFile>,
}

/// Execute `chainstat metrics`.
pub fn run_metrics(
    args: &MetricsArgs,
    config: &ProjectConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let (report, skipped) = load_dir(&args.graph_dir)?;
    let collection = &report.graphs;

    let reports: BTreeMap<String, TableReport> = match &args.groups {
        Some(path) => {
            let grouping = load_grouping(path)?;
            compute_group_tables(collection, &grouping, &config.metrics)
        }
        None => BTreeMap::from([(
            ALL_GROUP.to_string(),
            compute_table(&collection.all().entries, &config.metrics),
        )]),
    };

    let samples = args.samples.as_deref().map(load_samples).transpose()?;

    let mut tables = Vec::with_capacity(reports.len());
    for (group, report) in reports {
        // Null distributions are in raw units, so test before normalizing.
        let p_values = match (&samples, &args.p_column) {
            (Some(samples), Some(column)) => Some(
                column_p_values(&report.table, column, samples)
                    .with_context(|| format!("failed to test column {column} in group {group}"))?,
            ),
            _ => None,
        };
        let table = arrange(report.table, args)
            .with_context(|| format!("failed to arrange table for group {group}"))?;
        let failures = report
            .failures
            .into_iter()
            .map(|(graph, error)| GraphFailure {
                graph,
                error: error.to_string(),
            })
            .collect();
        tables.push(GroupTable {
            group,
            table,
            failures,
            p_values,
        });
    }

    info!(tables = tables.len(), "metrics computed");
    let snapshots = collection
        .iter()
        .map(|(name, graph)| (name.to_string(), graph.content_hash().to_string()))
        .collect();
    let payload = MetricsOutput {
        tables,
        snapshots,
        skipped,
    };
    render_mode(output, &payload, render_metrics_text, render_metrics_pretty)
}

/// Apply `--normalize` / `--sort-by` to one table.
fn arrange(table: MetricsTable, args: &MetricsArgs) -> anyhow::Result<MetricsTable> {
    if args.normalize {
        let sort_by = args.sort_by.as_deref().unwrap_or("nodes");
        let exclude: Vec<&str> = args.exclude.iter().map(String::as_str).collect();
        return Ok(z_normalize(&table, sort_by, &exclude)?);
    }
    match &args.sort_by {
        Some(column) => Ok(table.sorted_by(column)?),
        None => Ok(table),
    }
}

fn load_samples(path: &Path) -> anyhow::Result<BTreeMap<String, Vec<f64>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse null distributions in {}", path.display()))
}

fn render_metrics_text(payload: &MetricsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for (i, group) in payload.tables.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        writeln!(w, "# {}", group.group)?;
        write_table_text(&group.table, w)?;
        for failure in &group.failures {
            writeln!(w, "! {}\t{}", failure.graph, failure.error)?;
        }
        if let Some(p_values) = &group.p_values {
            for (graph, p) in p_values {
                writeln!(w, "p\t{graph}\t{p:.3}")?;
            }
        }
    }
    for skipped in &payload.skipped {
        writeln!(w, "! {}\t{}", skipped.path, skipped.error)?;
    }
    Ok(())
}

fn render_metrics_pretty(payload: &MetricsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for group in &payload.tables {
        writeln!(w, "== {} ({} graphs) ==", group.group, group.table.len())?;
        writeln!(w)?;
        write_table_pretty(&group.table, w)?;
        if !group.failures.is_empty() {
            writeln!(w)?;
            pretty_section(w, "Not measured")?;
            for failure in &group.failures {
                writeln!(w, "  {}: {}", failure.graph, failure.error)?;
            }
        }
        if let Some(p_values) = &group.p_values {
            writeln!(w)?;
            pretty_section(w, "Empirical p-values")?;
            let width = p_values.keys().map(String::len).max().unwrap_or(0);
            for (graph, p) in p_values {
                pretty_kv(w, graph, format!("{p:.3}"), width)?;
            }
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
    use chainstat_metrics::Cell;

    fn table() -> MetricsTable {
        let mut table = MetricsTable::new(["nodes", "reciprocity"]);
        table.push_row("a", vec![Cell::Int(1), Cell::Float(0.5)]);
        table.push_row("b", vec![Cell::Int(3), Cell::Null]);
        table
    }

    #[test]
    fn metrics_args_parse() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: MetricsArgs,
        }

        let parsed = Wrapper::parse_from([
            "test",
            "graphs",
            "--normalize",
            "--sort-by",
            "density",
            "--exclude",
            "nodes",
            "--exclude",
            "edges",
        ]);
        assert!(parsed.args.normalize);
        assert_eq!(parsed.args.sort_by.as_deref(), Some("density"));
        assert_eq!(parsed.args.exclude, vec!["nodes", "edges"]);
    }

    #[test]
    fn arrange_sorts_without_normalizing() {
        let args = MetricsArgs {
            sort_by: Some("nodes".into()),
            ..MetricsArgs::default()
        };
        let arranged = arrange(table(), &args).expect("arrange");
        assert_eq!(arranged.rows()[0].name, "b");
        assert_eq!(arranged.value("b", "nodes"), Some(&Cell::Int(3)));
    }

    #[test]
    fn arrange_rejects_unknown_column() {
        let args = MetricsArgs {
            sort_by: Some("bogus".into()),
            ..MetricsArgs::default()
        };
        assert!(arrange(table(), &args).is_err());
    }
}
