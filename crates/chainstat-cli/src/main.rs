#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;

use chainstat_core::config::resolve_config;
use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "chainstat: structural statistics for collections of interaction graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (default: pretty on a terminal, text when piped).
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Configuration file (default: ./chainstat.toml, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Graph metrics",
        about = "Compute the metric table for a directory of graphs",
        after_help = "EXAMPLES:\n    # One table for every graph\n    chainstat metrics data/graphs\n\n    # One table per group, z-scored and ranked by reciprocity\n    chainstat metrics data/graphs --groups groups.json --normalize --sort-by reciprocity"
    )]
    Metrics(cmd::metrics::MetricsArgs),

    #[command(about = "Show strongly connected component sizes per graph")]
    Components(cmd::components::ComponentsArgs),

    #[command(about = "Cosine similarity of nodes in one graph")]
    Similarity(cmd::similarity::SimilarityArgs),

    #[command(about = "Empirical p-value of a statistic against resampled values")]
    Pvalue(cmd::pvalue::PvalueArgs),

    #[command(
        next_help_heading = "Groupings",
        about = "Compare a candidate grouping against an authoritative one"
    )]
    Reconcile(cmd::reconcile::ReconcileArgs),

    #[command(
        about = "Repair a candidate grouping: drop additions, apply casing fixes",
        after_help = "EXAMPLES:\n    # Write the corrected grouping to a file\n    chainstat correct --candidate model.json --authoritative truth.json --output fixed.json"
    )]
    Correct(cmd::correct::CorrectArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CHAINSTAT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "chainstat=debug,info"
        } else {
            "chainstat=info,warn"
        })
    });

    let format = env::var("CHAINSTAT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let working_dir = env::current_dir()?;
    let config = resolve_config(cli.config.as_deref(), &working_dir)?;
    debug!(?config, "resolved configuration");

    let output = resolve_output_mode(cli.format);

    match cli.command {
        Commands::Metrics(ref args) => cmd::metrics::run_metrics(args, &config, output),
        Commands::Components(ref args) => cmd::components::run_components(args, output),
        Commands::Similarity(ref args) => {
            cmd::similarity::run_similarity(args, &config.metrics, output)
        }
        Commands::Pvalue(ref args) => cmd::pvalue::run_pvalue(args, output),
        Commands::Reconcile(ref args) => {
            cmd::reconcile::run_reconcile(args, &config.groups, output)
        }
        Commands::Correct(ref args) => cmd::correct::run_correct(args, output),
    }
}
