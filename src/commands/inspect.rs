//! Inspect command implementation
//!
//! Runs the pipeline up to entry point selection: collect, transform, load
//! and index. The entry point is validated but never invoked.

use console::Style;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use loadstone::boot::{Bindings, Pipeline, entry_method, select_entry_point};
use loadstone::config::DebugFlags;
use loadstone::error::Result;
use loadstone::index::MarkerIndex;
use loadstone::loader::LoadedUnit;

use crate::cli::InspectArgs;

/// Run inspect command
pub fn run(config: Option<&Path>, flags: &DebugFlags, args: InspectArgs) -> Result<()> {
    let mut config = super::launch_config(config, args.sources)?;
    config.public_types.extend(args.public_types);

    let mut pipeline = Pipeline::new(config, flags.clone(), Bindings::new())?;
    let markers = pipeline.load()?;

    print_units(pipeline.loader().loaded());
    print_markers(&markers);

    let entry = select_entry_point(&markers)?;
    let method = entry_method(&entry)?;
    println!();
    println!(
        "Entry point: {}::{}",
        Style::new().green().bold().apply_to(entry.name()),
        method.name
    );

    Ok(())
}

fn print_units(units: &[Arc<LoadedUnit>]) {
    let name_style = Style::new().cyan().bold();
    let dim = Style::new().dim();

    println!("Loaded units ({}):", units.len());
    println!();
    for unit in units {
        let mut line = format!("  {}", name_style.apply_to(unit.name()));
        if let Some(supertype) = unit.supertype() {
            let _ = write!(line, " {}", dim.apply_to(format!("extends {}", supertype.name())));
        }
        println!("{line}");

        let slots: Vec<&str> = unit.slot_names().collect();
        if !slots.is_empty() {
            println!("    {} {}", dim.apply_to("slots:"), slots.join(", "));
        }
    }
}

fn print_markers(markers: &MarkerIndex) {
    let kind_style = Style::new().yellow();

    println!();
    if markers.is_empty() {
        println!("No markers found.");
        return;
    }

    println!("Markers:");
    for kind in markers.kinds() {
        let names: Vec<&str> = markers.query(kind).iter().map(|unit| unit.name()).collect();
        println!("  {}: {}", kind_style.apply_to(kind), names.join(", "));
    }
}
