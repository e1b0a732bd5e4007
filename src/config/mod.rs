//! Configuration handling for loadstone
//!
//! This module contains:
//! - `loadstone.yaml` - launch configuration (sources, assets, rewrite tables)
//! - `LOADSTONE_*` environment flags - developer and debug switches read once at startup

pub mod flags;
pub mod launch;

// Re-export commonly used types
pub use flags::DebugFlags;
pub use launch::{CONFIG_FILE, LaunchConfig};
