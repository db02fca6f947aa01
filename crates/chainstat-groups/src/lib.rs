#![forbid(unsafe_code)]
//! chainstat-groups library.
//!
//! Compares a candidate categorization against an authoritative identifier
//! set and edits groupings to repair it:
//!
//! ```text
//! authoritative set + candidate Grouping
//!        ↓  reconcile::reconcile_grouping()
//! Reconciliation { true_missing, true_add, changed }
//!        ↓  edit::remove(true_add), edit::apply_corrections(changed)
//! corrected Grouping
//! ```
//!
//! Identifiers are compared exactly first, then case-insensitively; a
//! case-only mismatch is reported in `changed` and never applied
//! automatically.
//!
//! # Conventions
//!
//! - **Errors**: none; every operation is a pure function over in-memory sets.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod edit;
pub mod reconcile;

pub use edit::{apply_corrections, merge_new_categorization, remove, uncategorized};
pub use reconcile::{
    Reconciliation, grouped_identifiers, missing_and_added, reconcile, reconcile_grouping,
};
