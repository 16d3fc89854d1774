//! Create command implementation

use console::Style;

use crate::cli::CreateArgs;
use crate::error::Result;
use crate::git::{Git2Client, GitSourceProvider};
use crate::pipeline::{self, PackageOptions, PackageOutcome};

impl From<&CreateArgs> for PackageOptions {
    fn from(args: &CreateArgs) -> Self {
        PackageOptions {
            config_file: args.config_file.clone(),
            output: args.output.clone(),
            template_output: args.template_output.clone(),
            registry: args.registry.clone(),
            credentials_selector: args.registry_credselector.clone(),
            git_remote: args.git_remote.clone(),
            overwrite: args.overwrite,
            dry_run: args.dry_run,
        }
    }
}

/// Run create command
pub fn run(args: &CreateArgs) -> Result<()> {
    let options = PackageOptions::from(args);
    let mut git = GitSourceProvider::new(Git2Client);
    let outcome = pipeline::run(&options, &mut git)?;
    print_summary(&outcome, args.dry_run);
    Ok(())
}

fn print_summary(outcome: &PackageOutcome, dry_run: bool) {
    let bold = Style::new().bold();
    let component = &outcome.descriptor.component;

    if dry_run {
        println!(
            "{} {} {}",
            Style::new().yellow().bold().apply_to("Validated"),
            Style::new().cyan().apply_to(&component.name),
            component.version
        );
    } else {
        println!(
            "{} {} {}",
            Style::new().green().bold().apply_to("Packaged"),
            Style::new().cyan().apply_to(&component.name),
            component.version
        );
    }

    println!("  {} {}", bold.apply_to("Resources:"), component.resources.len());
    for resource in &component.resources {
        println!("    - {} ({})", resource.name, resource.resource_type);
    }
    println!("  {} {}", bold.apply_to("Sources:"), component.sources.len());

    if let Some(archive) = &outcome.archive {
        println!("  {} {}", bold.apply_to("Archive:"), archive.display());
    }
    if let Some(template) = &outcome.template_file {
        println!("  {} {}", bold.apply_to("Template:"), template.display());
    }
}
