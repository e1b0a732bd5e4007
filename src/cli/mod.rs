//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - units: Units command arguments
//! - inspect: Inspect command arguments
//! - resolve: Resolve command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod inspect;
pub mod resolve;
pub mod units;

pub use completions::CompletionsArgs;
pub use inspect::InspectArgs;
pub use resolve::ResolveArgs;
pub use units::UnitsArgs;

/// Loadstone - application bootstrap
///
/// Collect, rewrite and load code units, then resolve registries in dependency order.
#[derive(Parser, Debug)]
#[command(
    name = "loadstone",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Application bootstrap with isolated unit loading and ordered registry initialization",
    long_about = "Loadstone collects code units from directories and archives, rewrites them in flight, \
                  loads them into an isolated table and indexes their markers. Registries are \
                  initialized in dependency order, with cycles reported before anything loads.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  loadstone units ./build/units            \x1b[90m# List collected units\x1b[0m\n   \
                  loadstone inspect ./build/app.zip        \x1b[90m# Load units and show markers\x1b[0m\n   \
                  loadstone resolve registries.yaml        \x1b[90m# Print registry load order\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Launch configuration file (defaults to ./loadstone.yaml when present)
    #[arg(long, short = 'c', global = true, env = "LOADSTONE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List units found in the source locations
    Units(UnitsArgs),

    /// Load every unit and show the marker index and entry point
    Inspect(InspectArgs),

    /// Resolve a registry dependency map into a load order
    Resolve(ResolveArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
