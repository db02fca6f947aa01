#![forbid(unsafe_code)]
//! chainstat-core library.
//!
//! Shared vocabulary for the chainstat workspace: the immutable directed
//! graph snapshot, the JSON loaders that produce it, named graph
//! collections, category groupings, and project configuration.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at the library boundary
//!   ([`LoadError`], [`GroupingError`]); `anyhow::Result` for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod collection;
pub mod config;
pub mod error;
pub mod graph;
pub mod grouping;

pub use collection::{GraphCollection, Selection};
pub use config::{GroupSettings, MetricsSettings, ProjectConfig};
pub use error::{GroupingError, LoadError};
pub use graph::{DirectedGraph, NeighborDirection};
pub use grouping::Grouping;
