//! modulectl - Kyma module packaging
//!
//! Turns a module configuration plus rendered manifests into an OCM
//! component descriptor, a component archive and a ModuleTemplate.

pub mod archive;
pub mod blob;
pub mod cli;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod files;
pub mod git;
pub mod image;
pub mod manifest;
pub mod pipeline;
pub mod progress;
pub mod resources;
pub mod security;
pub mod selector;
pub mod template;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};
use error::Result;

/// Run the parsed command line
pub fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Create(args) => commands::create::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
