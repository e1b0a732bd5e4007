//! Command implementations for the loadstone CLI

use std::path::{Path, PathBuf};

use loadstone::config::LaunchConfig;
use loadstone::error::{LoadstoneError, Result};

pub mod completions;
pub mod inspect;
pub mod resolve;
pub mod units;
pub mod version;

/// Launch configuration from `--config` or the working directory
///
/// Sources given on the command line replace the configured ones.
pub fn launch_config(explicit: Option<&Path>, sources: Vec<PathBuf>) -> Result<LaunchConfig> {
    let cwd = std::env::current_dir().map_err(|e| LoadstoneError::IoError {
        message: format!("Failed to get current directory: {e}"),
    })?;

    Ok(LaunchConfig::discover(explicit, &cwd)?.with_sources(sources))
}
