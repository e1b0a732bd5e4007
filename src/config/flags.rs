//! Developer and debug switches
//!
//! Read once at startup from the process environment and passed down
//! explicitly; nothing re-reads the environment afterwards.

use std::path::PathBuf;

/// Developer mode: discloses internal names and full failure detail
pub const ENV_DEVELOPER: &str = "LOADSTONE_DEV";
/// Log rejected accesses to pipeline-internal units
pub const ENV_DEBUG_ACCESS: &str = "LOADSTONE_DEBUG_ACCESS";
/// Log every unit as it is defined
pub const ENV_DEBUG_LOADS: &str = "LOADSTONE_DEBUG_LOADS";
/// Log markers found while building the marker index
pub const ENV_DEBUG_MARKERS: &str = "LOADSTONE_DEBUG_MARKERS";
/// Log every transform rule that rewrote a unit
pub const ENV_DEBUG_TRANSFORMS: &str = "LOADSTONE_DEBUG_TRANSFORMS";
/// Log the reason of every failing transform rule
pub const ENV_DEBUG_TRANSFORM_ERRORS: &str = "LOADSTONE_DEBUG_TRANSFORM_ERRORS";
/// Directory receiving transformed units
pub const ENV_DUMP_DIR: &str = "LOADSTONE_DUMP_DIR";

/// Debug flags shared by every pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugFlags {
    pub developer: bool,
    pub access: bool,
    pub loads: bool,
    pub markers: bool,
    pub transforms: bool,
    pub transform_errors: bool,
    pub dump_dir: Option<PathBuf>,
}

impl DebugFlags {
    /// Read flags from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read flags through an arbitrary variable lookup
    ///
    /// Developer mode switches every verbose flag on.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = |key: &str| lookup(key).is_some_and(|v| is_truthy(&v));
        let developer = enabled(ENV_DEVELOPER);

        Self {
            developer,
            access: developer || enabled(ENV_DEBUG_ACCESS),
            loads: developer || enabled(ENV_DEBUG_LOADS),
            markers: developer || enabled(ENV_DEBUG_MARKERS),
            transforms: developer || enabled(ENV_DEBUG_TRANSFORMS),
            transform_errors: developer || enabled(ENV_DEBUG_TRANSFORM_ERRORS),
            dump_dir: lookup(ENV_DUMP_DIR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// All verbose flags on
    pub fn developer() -> Self {
        Self {
            developer: true,
            access: true,
            loads: true,
            markers: true,
            transforms: true,
            transform_errors: true,
            dump_dir: None,
        }
    }

    /// Use `dir` as dump directory unless the environment already chose one
    pub fn with_fallback_dump_dir(mut self, dir: Option<PathBuf>) -> Self {
        if self.dump_dir.is_none() {
            self.dump_dir = dir;
        }
        self
    }

    /// Whether any flag asks for verbose logging
    pub fn any_verbose(&self) -> bool {
        self.developer
            || self.access
            || self.loads
            || self.markers
            || self.transforms
            || self.transform_errors
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
