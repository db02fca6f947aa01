//! `chainstat pvalue`: empirical p-value of one observed statistic.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chainstat_metrics::empirical_p_value;
use clap::Args;
use serde::Serialize;

use crate::output::{OutputMode, pretty_kv, render};

/// Arguments for `chainstat pvalue`.
#[derive(Args, Debug)]
pub struct PvalueArgs {
    /// Value of the statistic on the observed graph.
    #[arg(long, allow_negative_numbers = true)]
    pub observed: f64,

    /// JSON array of the statistic on 1000 randomized graphs.
    #[arg(long, value_name = "FILE")]
    pub samples: PathBuf,
}

#[derive(Debug, Serialize)]
struct PvalueOutput {
    observed: f64,
    resamples: usize,
    below: usize,
    above: usize,
    p_value: f64,
}

/// Execute `chainstat pvalue`.
pub fn run_pvalue(args: &PvalueArgs, output: OutputMode) -> anyhow::Result<()> {
    let resamples = read_resamples(&args.samples)?;
    let p_value = empirical_p_value(args.observed, &resamples)
        .with_context(|| format!("invalid null distribution in {}", args.samples.display()))?;

    let payload = PvalueOutput {
        observed: args.observed,
        resamples: resamples.len(),
        below: resamples.iter().filter(|&&r| r < args.observed).count(),
        above: resamples.iter().filter(|&&r| r > args.observed).count(),
        p_value,
    };
    render(output, &payload, render_pvalue_human)
}

fn read_resamples(path: &Path) -> anyhow::Result<Vec<f64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("expected a JSON array of numbers in {}", path.display()))
}

fn render_pvalue_human(payload: &PvalueOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_kv(w, "observed", payload.observed.to_string(), 9)?;
    pretty_kv(
        w,
        "resamples",
        format!(
            "{} ({} below, {} above)",
            payload.resamples, payload.below, payload.above
        ),
        9,
    )?;
    pretty_kv(w, "p-value", format!("{:.3}", payload.p_value), 9)
}
