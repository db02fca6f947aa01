//! Project configuration (`chainstat.toml`).
//!
//! ```toml
//! [metrics]
//! damping = 0.85
//! tolerance = 1e-6
//! max_iter = 100
//! density_decimals = 6
//! similarity_direction = "in"
//!
//! [groups]
//! fallback_category = "other"
//! ```
//!
//! Every field is optional; missing fields take the defaults shown above.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::NeighborDirection;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "chainstat.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub groups: GroupSettings,
}

/// Knobs for the per-graph metric bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// PageRank damping factor.
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// PageRank per-node convergence tolerance.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// PageRank iteration cap.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Decimal places kept for density.
    #[serde(default = "default_density_decimals")]
    pub density_decimals: u32,
    /// Neighborhood used for the `mean_cos_sim` column.
    #[serde(default)]
    pub similarity_direction: NeighborDirection,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            tolerance: default_tolerance(),
            max_iter: default_max_iter(),
            density_decimals: default_density_decimals(),
            similarity_direction: NeighborDirection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettings {
    /// Catch-all category used for uncategorized identifiers.
    #[serde(default = "default_fallback_category")]
    pub fallback_category: String,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            fallback_category: default_fallback_category(),
        }
    }
}

/// Parse a configuration from TOML text.
///
/// # Errors
///
/// Returns an error if the text is not valid TOML for [`ProjectConfig`].
pub fn parse_config(content: &str) -> Result<ProjectConfig> {
    toml::from_str::<ProjectConfig>(content).context("Failed to parse chainstat config")
}

/// Load a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the effective configuration.
///
/// Precedence: `explicit` path, then `chainstat.toml` in `working_dir`, then
/// `<config dir>/chainstat/config.toml`, then defaults. An explicit path
/// that does not exist is an error; the implicit locations are optional.
///
/// # Errors
///
/// Returns an error if a selected file cannot be read or parsed.
pub fn resolve_config(explicit: Option<&Path>, working_dir: &Path) -> Result<ProjectConfig> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    let local = working_dir.join(CONFIG_FILE_NAME);
    if local.exists() {
        return load_config_file(&local);
    }

    if let Some(user) = user_config_path()
        && user.exists()
    {
        return load_config_file(&user);
    }

    Ok(ProjectConfig::default())
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chainstat/config.toml"))
}

const fn default_damping() -> f64 {
    0.85
}

const fn default_tolerance() -> f64 {
    1e-6
}

const fn default_max_iter() -> usize {
    100
}

const fn default_density_decimals() -> u32 {
    6
}

fn default_fallback_category() -> String {
    "other".to_string()
}
