//! Resolve command implementation
//!
//! Reads a YAML dependency map and prints the load order the registry
//! loader would use for it.

use console::Style;
use indexmap::IndexMap;
use std::path::Path;

use loadstone::error::{LoadstoneError, Result};
use loadstone::resolver;

use crate::cli::ResolveArgs;

/// Run resolve command
pub fn run(args: ResolveArgs) -> Result<()> {
    let dependencies = read_dependency_map(&args.file)?;
    let order = resolver::resolve(&dependencies)?;

    if order.is_empty() {
        println!("No registries declared.");
        return Ok(());
    }

    let name_style = Style::new().cyan().bold();
    println!("Load order ({}):", order.len());
    println!();
    for (position, name) in order.iter().enumerate() {
        println!("  {:>3}. {}", position + 1, name_style.apply_to(name));
    }

    Ok(())
}

/// Parse `registry: [deps]` pairs, keeping file order
///
/// A registry without a value has no dependencies.
fn read_dependency_map(path: &Path) -> Result<IndexMap<String, Vec<String>>> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadstoneError::ConfigReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let raw: Option<IndexMap<String, Option<Vec<String>>>> = serde_yaml::from_str(&content)
        .map_err(|e| LoadstoneError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, deps)| (name, deps.unwrap_or_default()))
        .collect())
}
