//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// modulectl - Kyma module packaging
///
/// Package a module's manifests, default CR and images into an OCM
/// component archive and render its ModuleTemplate.
#[derive(Parser, Debug)]
#[command(
    name = "modulectl",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Package Kyma modules into OCM component archives",
    long_about = "modulectl turns a module configuration plus rendered manifests into a \
                  validated OCM component descriptor, a component archive holding the \
                  module's blobs, and the ModuleTemplate that carries it into a cluster.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  modulectl create\n    \
                  modulectl create --config-file module-config.yaml --registry http://localhost:5001\n    \
                  modulectl create --dry-run"
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Package a module into a component archive and ModuleTemplate
    Create(CreateArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the create command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Package the module in the current directory:\n    modulectl create\n\n\
                   Use a specific config file:\n    modulectl create --config-file ./modules/sample/module-config.yaml\n\n\
                   Reference the module image in a registry:\n    modulectl create --registry http://localhost:5001\n\n\
                   Select registry credentials:\n    modulectl create --registry-credselector operator.kyma-project.io/oci-registry-cred=test-operator\n\n\
                   Validate without writing anything:\n    modulectl create --dry-run")]
pub struct CreateArgs {
    /// Module config file
    #[arg(long, short = 'c', default_value = "module-config.yaml")]
    pub config_file: PathBuf,

    /// Component archive directory
    #[arg(long, short = 'o', default_value = "component-archive")]
    pub output: PathBuf,

    /// File the ModuleTemplate is written to
    #[arg(long, default_value = "template.yaml")]
    pub template_output: PathBuf,

    /// Registry the module image is pushed to
    #[arg(long, env = "MODULECTL_REGISTRY")]
    pub registry: Option<String>,

    /// Label selector matching the registry credentials secret
    #[arg(long, env = "MODULECTL_CREDENTIALS_SELECTOR", default_value = "")]
    pub registry_credselector: String,

    /// Git remote of the module sources (overrides `repository` in the config)
    #[arg(long)]
    pub git_remote: Option<String>,

    /// Replace an existing component archive
    #[arg(long)]
    pub overwrite: bool,

    /// Build and validate without writing the archive or template
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    modulectl completions --shell bash > ~/.bash_completion.d/modulectl\n\n\
                  Generate zsh completions:\n    modulectl completions --shell zsh > ~/.zfunc/_modulectl\n\n\
                  Generate fish completions:\n    modulectl completions --shell fish > ~/.config/fish/completions/modulectl.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
