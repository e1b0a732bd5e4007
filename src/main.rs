//! Loadstone - application bootstrap
//!
//! Command line front end for inspecting unit sources and registry
//! dependency maps with the same pipeline host applications boot through.

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use loadstone::boot;
use loadstone::config::DebugFlags;
use loadstone::error::LoadstoneError;
use loadstone::logging;

/// Whether a failure happened before any unit or registry was touched
fn is_usage_error(err: &LoadstoneError) -> bool {
    matches!(
        err,
        LoadstoneError::ConfigReadFailed { .. }
            | LoadstoneError::ConfigParseFailed { .. }
            | LoadstoneError::IoError { .. }
    )
}

fn main() {
    let cli = Cli::parse();
    let flags = DebugFlags::from_env();
    logging::init(cli.verbose || flags.any_verbose());

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Units(args) => commands::units::run(config, args),
        Commands::Inspect(args) => commands::inspect::run(config, &flags, args),
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        if is_usage_error(&e) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        boot::terminate(&e, &flags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_failures_are_usage_errors() {
        let err = LoadstoneError::ConfigParseFailed {
            path: "loadstone.yaml".to_string(),
            reason: "bad".to_string(),
        };
        assert!(is_usage_error(&err));
    }

    #[test]
    fn test_boot_failures_are_not_usage_errors() {
        assert!(!is_usage_error(&LoadstoneError::NoEntryPoint));
        assert!(!is_usage_error(&LoadstoneError::CircularDependency {
            report: String::new(),
            cycles: Vec::new(),
        }));
    }
}
