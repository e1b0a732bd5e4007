use clap::Parser;
use std::path::PathBuf;

/// Arguments for the inspect command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Inspect the configured sources:\n    loadstone inspect\n\n\
                  Inspect an archive, widening one type to public:\n    loadstone inspect app.zip --public app.world.Tile\n\n\
                  Keep transformed units for offline inspection:\n    LOADSTONE_DUMP_DIR=./dump loadstone inspect")]
pub struct InspectArgs {
    /// Source directories or zip archives (override the configured sources)
    pub sources: Vec<PathBuf>,

    /// Additional type to widen to public visibility (repeatable)
    #[arg(long = "public", value_name = "TYPE")]
    pub public_types: Vec<String>,
}
