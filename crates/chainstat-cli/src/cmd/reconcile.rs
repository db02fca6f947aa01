//! `chainstat reconcile`: compare a candidate grouping against an
//! authoritative one.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use chainstat_core::GroupSettings;
use chainstat_groups::{Reconciliation, grouped_identifiers, reconcile_grouping, uncategorized};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::cmd::load_grouping;
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `chainstat reconcile`.
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Grouping whose identifiers are the reference set.
    #[arg(long, value_name = "FILE")]
    pub authoritative: PathBuf,

    /// Grouping to check.
    #[arg(long, value_name = "FILE")]
    pub candidate: PathBuf,
}

#[derive(Debug, Serialize)]
struct ReconcileOutput {
    #[serde(flatten)]
    reconciliation: Reconciliation,
    /// Candidate identifiers filed only under the fallback category.
    uncategorized: BTreeSet<String>,
    fallback_category: String,
}

/// Execute `chainstat reconcile`.
pub fn run_reconcile(
    args: &ReconcileArgs,
    settings: &GroupSettings,
    output: OutputMode,
) -> anyhow::Result<()> {
    let authoritative = grouped_identifiers(&load_grouping(&args.authoritative)?);
    let candidate = load_grouping(&args.candidate)?;

    let reconciliation = reconcile_grouping(&authoritative, &candidate);
    info!(clean = reconciliation.is_clean(), "reconciliation complete");

    let payload = ReconcileOutput {
        reconciliation,
        uncategorized: uncategorized(&candidate, &settings.fallback_category),
        fallback_category: settings.fallback_category.clone(),
    };
    render_mode(output, &payload, render_reconcile_text, render_reconcile_pretty)
}

/// One line per finding: `<kind>\t<identifier>[\t<authoritative forms>]`.
fn render_reconcile_text(payload: &ReconcileOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let r = &payload.reconciliation;
    for id in &r.true_missing {
        writeln!(w, "missing\t{id}")?;
    }
    for id in &r.true_add {
        writeln!(w, "added\t{id}")?;
    }
    for (id, forms) in &r.changed {
        let forms: Vec<&str> = forms.iter().map(String::as_str).collect();
        writeln!(w, "changed\t{id}\t{}", forms.join(","))?;
    }
    for id in &payload.uncategorized {
        writeln!(w, "uncategorized\t{id}")?;
    }
    Ok(())
}

fn render_reconcile_pretty(payload: &ReconcileOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let r = &payload.reconciliation;
    if r.is_clean() {
        writeln!(w, "Candidate matches the authoritative identifiers.")?;
    }
    if !r.true_missing.is_empty() {
        pretty_section(w, &format!("Missing ({})", r.true_missing.len()))?;
        for id in &r.true_missing {
            writeln!(w, "  {id}")?;
        }
        writeln!(w)?;
    }
    if !r.true_add.is_empty() {
        pretty_section(w, &format!("Added ({})", r.true_add.len()))?;
        for id in &r.true_add {
            writeln!(w, "  {id}")?;
        }
        writeln!(w)?;
    }
    if !r.changed.is_empty() {
        pretty_section(w, &format!("Casing changed ({})", r.changed.len()))?;
        for (id, forms) in &r.changed {
            let forms: Vec<&str> = forms.iter().map(String::as_str).collect();
            writeln!(w, "  {id} -> {}", forms.join(", "))?;
        }
        writeln!(w)?;
    }
    if !payload.uncategorized.is_empty() {
        pretty_section(
            w,
            &format!(
                "Only in \"{}\" ({})",
                payload.fallback_category,
                payload.uncategorized.len()
            ),
        )?;
        for id in &payload.uncategorized {
            writeln!(w, "  {id}")?;
        }
    }
    Ok(())
}
