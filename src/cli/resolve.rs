use clap::Parser;
use std::path::PathBuf;

/// Arguments for the resolve command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Print the load order of a dependency map:\n    loadstone resolve registries.yaml\n\n\
                  File format (registration order is file order):\n    \
                  blocks: []\n    \
                  items: [blocks]\n    \
                  recipes: [items, blocks]")]
pub struct ResolveArgs {
    /// YAML file mapping each registry to the registries it depends on
    pub file: PathBuf,
}
