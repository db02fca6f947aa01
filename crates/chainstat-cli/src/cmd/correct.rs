//! `chainstat correct`: repair a candidate grouping against an
//! authoritative one.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chainstat_core::Grouping;
use chainstat_groups::{
    apply_corrections, grouped_identifiers, merge_new_categorization, reconcile_grouping, remove,
};
use clap::Args;
use tracing::{info, warn};

use crate::cmd::load_grouping;
use crate::output::OutputMode;

/// Arguments for `chainstat correct`.
#[derive(Args, Debug)]
pub struct CorrectArgs {
    /// Grouping to repair.
    #[arg(long, value_name = "FILE")]
    pub candidate: PathBuf,

    /// Grouping whose identifiers are the reference set.
    #[arg(long, value_name = "FILE")]
    pub authoritative: PathBuf,

    /// Further categorization batches merged into the candidate first.
    #[arg(long, value_name = "FILE")]
    pub merge: Vec<PathBuf>,

    /// Write the corrected grouping here instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Merge, reconcile, and repair `candidate`.
///
/// True additions are dropped and case-only mismatches are rewritten to
/// their authoritative forms. True omissions are left for the caller.
#[must_use]
pub fn correct(authoritative: &Grouping, mut candidate: Grouping, batches: &[Grouping]) -> Grouping {
    for batch in batches {
        merge_new_categorization(&mut candidate, batch);
    }
    let reference = grouped_identifiers(authoritative);
    let reconciliation = reconcile_grouping(&reference, &candidate);
    if !reconciliation.true_missing.is_empty() {
        warn!(
            missing = reconciliation.true_missing.len(),
            "authoritative identifiers absent from the candidate"
        );
    }
    info!(
        dropped = reconciliation.true_add.len(),
        corrected = reconciliation.changed.len(),
        "correcting candidate grouping"
    );
    let trimmed = remove(&candidate, &reconciliation.true_add);
    apply_corrections(&trimmed, &reconciliation.changed)
}

/// Execute `chainstat correct`.
///
/// The corrected grouping is always written as JSON; `--format` is ignored.
pub fn run_correct(args: &CorrectArgs, _output: OutputMode) -> anyhow::Result<()> {
    let authoritative = load_grouping(&args.authoritative)?;
    let candidate = load_grouping(&args.candidate)?;
    let batches = args
        .merge
        .iter()
        .map(|path| load_grouping(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let corrected = correct(&authoritative, candidate, &batches);
    let json = corrected
        .to_json_pretty()
        .context("failed to serialize corrected grouping")?;

    match &args.output {
        Some(path) => write_file(path, &json),
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{json}")?;
            Ok(())
        }
    }
}

fn write_file(path: &Path, json: &str) -> anyhow::Result<()> {
    std::fs::write(path, format!("{json}\n"))
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote corrected grouping");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn grouping(pairs: &[(&str, &[&str])]) -> Grouping {
        pairs
            .iter()
            .map(|(category, members)| (*category, members.iter().copied()))
            .collect()
    }

    #[test]
    fn correct_args_parse_repeated_merge() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: CorrectArgs,
        }

        let parsed = Wrapper::parse_from([
            "test",
            "--candidate",
            "model.json",
            "--authoritative",
            "truth.json",
            "--merge",
            "batch1.json",
            "--merge",
            "batch2.json",
            "-o",
            "fixed.json",
        ]);
        assert_eq!(parsed.args.merge.len(), 2);
        assert_eq!(parsed.args.output, Some(PathBuf::from("fixed.json")));
    }

    #[test]
    fn correct_drops_additions_and_fixes_casing() {
        let authoritative = grouping(&[("science", &["askscience", "physics"])]);
        let candidate = grouping(&[
            ("Science", &["AskScience", "physics"]),
            ("other", &["madeup"]),
        ]);

        let corrected = correct(&authoritative, candidate, &[]);

        let science = corrected.members("Science").expect("category kept");
        assert_eq!(
            science,
            &BTreeSet::from(["askscience".to_string(), "physics".to_string()])
        );
        assert!(corrected.members("other").expect("category kept").is_empty());
    }

    #[test]
    fn merged_batches_are_reconciled_too() {
        let authoritative = grouping(&[("science", &["askscience", "physics"])]);
        let candidate = grouping(&[("science", &["askscience"])]);
        let batch = grouping(&[("science", &["Physics"]), ("pics", &["aww"])]);

        let corrected = correct(&authoritative, candidate, &[batch]);

        assert_eq!(
            corrected.all_identifiers(),
            BTreeSet::from(["askscience".to_string(), "physics".to_string()])
        );
    }
}
