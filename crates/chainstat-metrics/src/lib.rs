#![forbid(unsafe_code)]
//! chainstat-metrics library.
//!
//! # Overview
//!
//! Computes a fixed bundle of structural statistics for every graph in a
//! collection and assembles them into one table per group of graphs:
//!
//! ```text
//! GraphCollection / Selection
//!        ↓  aggregate::compute_table()
//!   per graph (in parallel, read-only):
//!     structure::density / degree_one / reciprocity
//!     components::strong_components → containment, modularity
//!     pagerank::pagerank → PageRankSummary
//!     similarity::mean_cosine_similarity
//!        ↓
//! MetricsTable (one row per graph)
//!        ↓  table::z_normalize(), significance::column_p_values()
//! ranked / tested tables
//! ```
//!
//! # Conventions
//!
//! - **Errors**: [`MetricsError`] for failures the caller must see
//!   (non-convergence, bad resample sizes, unknown columns).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod aggregate;
pub mod components;
pub mod error;
pub mod pagerank;
pub mod significance;
pub mod similarity;
pub mod structure;
pub mod table;

pub use aggregate::{
    COLUMNS, GraphMetrics, TableReport, compute_graph_metrics, compute_group_tables, compute_table,
};
pub use error::MetricsError;
pub use significance::{RESAMPLE_SIZE, column_p_values, empirical_p_value};
pub use table::{Cell, MetricsTable, Row, z_normalize};
