//! Launch configuration (loadstone.yaml) data structures
//!
//! Describes where units are collected from, where registry assets live and
//! which constant tables the built-in rewrite rules are constructed with.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LoadstoneError, Result};
use crate::loader::DEFAULT_DELEGATE_PREFIXES;
use crate::registry::DEFAULT_NAMESPACE;

/// Default configuration file name
pub const CONFIG_FILE: &str = "loadstone.yaml";

/// Launch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchConfig {
    /// Unit source locations (directories or zip archives)
    pub sources: Vec<PathBuf>,

    /// Root directory of registry assets
    pub assets: Option<PathBuf>,

    /// Namespace of registry manifests
    pub namespace: String,

    /// Name prefixes always served by the platform instead of the sources
    pub delegate_prefixes: Vec<String>,

    /// Types whose declared visibility is widened to public on load
    pub public_types: Vec<String>,

    /// Directory receiving transformed units for offline inspection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_dir: Option<PathBuf>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            assets: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            delegate_prefixes: DEFAULT_DELEGATE_PREFIXES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            public_types: Vec::new(),
            dump_dir: None,
        }
    }
}

impl LaunchConfig {
    /// Parse launch configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// Relative paths inside the file are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LoadstoneError::ConfigReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| LoadstoneError::ConfigParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolved_against(base))
    }

    /// Load an explicit configuration file, or `loadstone.yaml` from `dir` if present
    ///
    /// An explicit path must exist; the implicit default file is optional.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let default_path = dir.join(CONFIG_FILE);
        if default_path.is_file() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Replace the configured sources when any are given
    pub fn with_sources(mut self, sources: Vec<PathBuf>) -> Self {
        if !sources.is_empty() {
            self.sources = sources;
        }
        self
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        let absolutize = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };

        self.sources = self.sources.into_iter().map(absolutize).collect();
        self.assets = self.assets.map(absolutize);
        self.dump_dir = self.dump_dir.map(absolutize);
        self
    }
}
