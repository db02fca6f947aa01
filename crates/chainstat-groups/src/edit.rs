//! Grouping edits: removals, casing corrections, merges.
//!
//! [`remove`] and [`apply_corrections`] return new groupings and leave their
//! input untouched. [`merge_new_categorization`] folds a fresh batch of
//! categorizations into an existing grouping in place.

use std::collections::{BTreeMap, BTreeSet};

use chainstat_core::Grouping;
use tracing::debug;

/// Copy of `groups` with every identifier in `removal` dropped from every
/// category. Categories that become empty are kept.
#[must_use]
pub fn remove(groups: &Grouping, removal: &BTreeSet<String>) -> Grouping {
    groups
        .iter()
        .map(|(category, members)| (category, members.difference(removal).cloned()))
        .collect()
}

/// Copy of `groups` with every member that is a key of `changes` replaced by
/// the identifiers it maps to.
#[must_use]
pub fn apply_corrections(
    groups: &Grouping,
    changes: &BTreeMap<String, BTreeSet<String>>,
) -> Grouping {
    let mut corrected = Grouping::new();
    for (category, members) in groups.iter() {
        let target = corrected.members_mut(category);
        for member in members {
            match changes.get(member) {
                Some(replacements) => {
                    debug!(category, from = member.as_str(), to = ?replacements, "correcting identifier");
                    target.extend(replacements.iter().cloned());
                }
                None => {
                    target.insert(member.clone());
                }
            }
        }
    }
    corrected
}

/// Union `new_data` into `existing` category by category, creating
/// categories `existing` lacks.
pub fn merge_new_categorization(existing: &mut Grouping, new_data: &Grouping) {
    for (category, members) in new_data.iter() {
        existing
            .members_mut(category)
            .extend(members.iter().cloned());
    }
}

/// Identifiers that appear in the `fallback` category and in no other.
///
/// Empty if `groups` has no `fallback` category.
#[must_use]
pub fn uncategorized(groups: &Grouping, fallback: &str) -> BTreeSet<String> {
    let Some(candidates) = groups.members(fallback) else {
        return BTreeSet::new();
    };
    let elsewhere: BTreeSet<&String> = groups
        .iter()
        .filter(|(category, _)| *category != fallback)
        .flat_map(|(_, members)| members)
        .collect();
    candidates
        .iter()
        .filter(|id| !elsewhere.contains(id))
        .cloned()
        .collect()
}
