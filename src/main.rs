//! modulectl - Kyma module packaging
//!
//! Command line entry point. See the library crate for the packaging pipeline.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use modulectl::cli::Cli;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = modulectl::dispatch(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
