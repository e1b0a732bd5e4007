//! Version command implementation

use loadstone::boot::FATAL_EXIT_CODE;
use loadstone::error::Result;

/// Run version command
pub fn run() -> Result<()> {
    println!("loadstone {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Rust version: {}", rustc_version());
    println!("  Profile: {}", build_profile());
    println!("  Fatal exit code: {FATAL_EXIT_CODE}");

    Ok(())
}

fn rustc_version() -> &'static str {
    env!("CARGO_PKG_RUST_VERSION")
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
