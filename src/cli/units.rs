use clap::Parser;
use std::path::PathBuf;

/// Arguments for the units command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List units from the configured sources:\n    loadstone units\n\n\
                  List units from a directory and an archive:\n    loadstone units ./classes ./plugins/extra.zip\n\n\
                  Show full digests:\n    loadstone units --full")]
pub struct UnitsArgs {
    /// Source directories or zip archives (override the configured sources)
    pub sources: Vec<PathBuf>,

    /// Show the full BLAKE3 digest of each unit
    #[arg(long)]
    pub full: bool,
}
