//! Version command implementation

use crate::descriptor::SCHEMA_VERSION;
use crate::error::Result;

/// Run version command
pub fn run() -> Result<()> {
    println!("modulectl {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("  Profile: {}", build_profile());
    println!("  Descriptor schema: {SCHEMA_VERSION}");

    Ok(())
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
