//! Units command implementation
//!
//! Collects units from the source locations and lists them with a digest
//! of their raw bytes. Nothing is transformed or loaded.

use console::Style;
use std::path::Path;

use loadstone::collector::{ArtifactCollector, CollectedUnits};
use loadstone::error::Result;
use loadstone::hash;

use crate::cli::UnitsArgs;

/// Run units command
pub fn run(config: Option<&Path>, args: UnitsArgs) -> Result<()> {
    let config = super::launch_config(config, args.sources)?;
    let units = ArtifactCollector::new(config.sources.iter().cloned()).collect()?;

    print_units(&units, args.full);
    Ok(())
}

fn print_units(units: &CollectedUnits, full: bool) {
    if units.is_empty() {
        println!("No units found.");
        return;
    }

    let name_style = Style::new().cyan().bold();
    let digest_style = Style::new().dim();

    println!("Collected units ({}):", units.len());
    println!();
    for (name, bytes) in units {
        let digest = if full {
            hash::digest(bytes)
        } else {
            hash::short_digest(bytes)
        };
        println!(
            "  {}  {}",
            name_style.apply_to(name),
            digest_style.apply_to(digest)
        );
    }
}
