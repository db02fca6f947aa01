//! Set reconciliation between an authoritative identifier set and a
//! candidate set.
//!
//! Categorizations produced by hand or by a model tend to "fix" the casing
//! of identifiers they were given. A plain set difference would report such
//! an identifier twice: once as missing (the original form) and once as
//! added (the altered form). [`reconcile`] separates those case-only
//! mismatches from genuine omissions and additions.

use std::collections::{BTreeMap, BTreeSet};

use chainstat_core::Grouping;
use serde::Serialize;
use tracing::{debug, instrument};

/// Outcome of comparing a candidate set against an authoritative one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Authoritative identifiers absent from the candidate under any casing.
    pub true_missing: BTreeSet<String>,
    /// Candidate identifiers with no authoritative counterpart under any casing.
    pub true_add: BTreeSet<String>,
    /// Mismatched identifiers that match case-insensitively, mapped to the
    /// authoritative forms they fold to.
    pub changed: BTreeMap<String, BTreeSet<String>>,
}

impl Reconciliation {
    /// `true` when the two sets were identical.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.true_missing.is_empty() && self.true_add.is_empty() && self.changed.is_empty()
    }
}

/// Plain two-way difference: `(authoritative − candidate, candidate − authoritative)`.
#[must_use]
pub fn missing_and_added(
    authoritative: &BTreeSet<String>,
    candidate: &BTreeSet<String>,
) -> (BTreeSet<String>, BTreeSet<String>) {
    let missing = authoritative.difference(candidate).cloned().collect();
    let added = candidate.difference(authoritative).cloned().collect();
    (missing, added)
}

/// Classify every mismatch between `authoritative` and `candidate`.
#[must_use]
#[instrument(skip_all, fields(authoritative = authoritative.len(), candidate = candidate.len()))]
pub fn reconcile(authoritative: &BTreeSet<String>, candidate: &BTreeSet<String>) -> Reconciliation {
    let mut folded_authoritative: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for id in authoritative {
        folded_authoritative
            .entry(id.to_lowercase())
            .or_default()
            .insert(id.clone());
    }
    let folded_candidate: BTreeSet<String> = candidate.iter().map(|id| id.to_lowercase()).collect();

    let (missing, added) = missing_and_added(authoritative, candidate);
    let mut result = Reconciliation::default();

    for id in missing {
        let folded = id.to_lowercase();
        match folded_authoritative.get(&folded) {
            Some(forms) if folded_candidate.contains(&folded) => {
                result.changed.insert(id, forms.clone());
            }
            _ => {
                result.true_missing.insert(id);
            }
        }
    }

    for id in added {
        match folded_authoritative.get(&id.to_lowercase()) {
            Some(forms) => {
                result.changed.insert(id, forms.clone());
            }
            None => {
                result.true_add.insert(id);
            }
        }
    }

    debug!(
        missing = result.true_missing.len(),
        added = result.true_add.len(),
        changed = result.changed.len(),
        "reconciled"
    );
    result
}

/// Union of every category's members.
#[must_use]
pub fn grouped_identifiers(grouping: &Grouping) -> BTreeSet<String> {
    grouping.all_identifiers()
}

/// Reconcile `authoritative` against everything `grouping` categorizes.
#[must_use]
pub fn reconcile_grouping(authoritative: &BTreeSet<String>, grouping: &Grouping) -> Reconciliation {
    reconcile(authoritative, &grouped_identifiers(grouping))
}
