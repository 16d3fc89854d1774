//! Module packaging pipeline
//!
//! One run turns a module config into a component archive and a
//! ModuleTemplate:
//!
//! 1. load and validate the module config
//! 2. resolve manifest, default CR and security config references
//! 3. generate the module resources
//! 4. add the git source
//! 5. add security scan metadata, if a security config exists
//! 6. point the module image at the registry, if one is given
//! 7. build and validate the descriptor
//! 8. write the component archive and the ModuleTemplate
//!
//! Every step runs sequentially. Downloaded files live until the run ends.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::archive::ComponentArchive;
use crate::config::{ModuleConfig, security, validate_module_config};
use crate::descriptor::{ComponentDescriptor, DescriptorBuilder};
use crate::error::{ModulectlError, Result, ResultExt, config as config_error, fs};
use crate::files::{FileReader, FileResolver, OsFileReader};
use crate::git::{GitClient, GitSourceProvider, add_git_source};
use crate::manifest::{YamlManifestParser, extract_images};
use crate::progress::Spinner;
use crate::resources::{self, MODULE_IMAGE_RESOURCE};
use crate::security::append_security_scan_config;
use crate::template;

/// Inputs of one packaging run
#[derive(Debug, Clone, Default)]
pub struct PackageOptions {
    pub config_file: PathBuf,
    pub output: PathBuf,
    pub template_output: PathBuf,
    pub registry: Option<String>,
    pub credentials_selector: String,
    pub git_remote: Option<String>,
    pub overwrite: bool,
    pub dry_run: bool,
}

/// Result of a packaging run
#[derive(Debug, Clone)]
pub struct PackageOutcome {
    pub config: ModuleConfig,
    pub descriptor: ComponentDescriptor,
    pub template: String,
    /// Archive directory, unless the run was a dry run
    pub archive: Option<PathBuf>,
    /// ModuleTemplate file, unless the run was a dry run
    pub template_file: Option<PathBuf>,
}

/// Run the packaging pipeline
pub fn run<C: GitClient>(
    options: &PackageOptions,
    git: &mut GitSourceProvider<C>,
) -> Result<PackageOutcome> {
    let reader = OsFileReader;

    let config = ModuleConfig::load(&reader, &options.config_file)
        .context("failed to parse module config")?;
    validate_module_config(&config).context("failed to validate module config")?;
    info!(module = %config.name, version = %config.version, "packaging module");

    let base_dir = options
        .config_file
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    // The metadata blob keeps the config as written; only file access uses
    // the resolved copy.
    let mut resolver = FileResolver::new(base_dir);
    let mut resolved = config.clone();
    resolved
        .resolve_paths(&mut resolver)
        .context("failed to resolve module files")?;

    let manifest_path = PathBuf::from(&resolved.manifest_path);
    let default_cr_path = (!resolved.default_cr_path.is_empty())
        .then(|| PathBuf::from(&resolved.default_cr_path));

    let resources = resources::generate(
        &config,
        &manifest_path,
        default_cr_path.as_deref(),
        &options.credentials_selector,
    )
    .context("failed to generate module resources")?;

    let mut builder = DescriptorBuilder::new(&config.name, &config.version);
    builder.add_resources(resources);

    let repo_url = options
        .git_remote
        .clone()
        .filter(|url| !url.is_empty())
        .or_else(|| (!config.repository.is_empty()).then(|| config.repository.clone()))
        .ok_or_else(|| {
            config_error::invalid(
                "repository",
                "must be set in the module config or passed with --git-remote",
            )
        })?;
    {
        let _spinner = Spinner::start(!options.dry_run, format!("Fetching {repo_url}"));
        add_git_source(git, &mut builder, &repo_url, &config.version)
            .context("failed to add git sources")?;
    }

    add_security_metadata(
        &reader,
        &resolved.security_config_path,
        &manifest_path,
        &mut builder,
    )?;

    if let Some(registry) = options.registry.as_deref().filter(|r| !r.is_empty()) {
        let access = resources::module_image_access(registry, &config.name, &config.version);
        if let Some(module_image) = builder.resource_mut(MODULE_IMAGE_RESOURCE) {
            module_image.access = Some(access);
        }
        builder.add_repository_context(resources::registry_context(registry));
    }

    let mut descriptor = builder
        .build()
        .context("failed to assemble component descriptor")?;

    let archive = if options.dry_run {
        None
    } else {
        let _spinner = Spinner::start(true, "Writing component archive");
        let archive = ComponentArchive::create(&options.output, &descriptor, options.overwrite)
            .context("failed to create component archive")?;
        descriptor = archive
            .add_module_resources(descriptor)
            .context("failed to add module resources to component archive")?;
        info!(path = %archive.root().display(), "component archive written");
        Some(archive.root().to_path_buf())
    };

    let default_cr = default_cr_path
        .as_deref()
        .map(|path| reader.read_to_string(path))
        .transpose()?;
    let rendered = template::render(&config, &descriptor, default_cr.as_deref())
        .context("failed to render module template")?;

    let template_file = if options.dry_run {
        None
    } else {
        std::fs::write(&options.template_output, &rendered).map_err(|e| {
            fs::write_failed(options.template_output.display().to_string(), e.to_string())
        })?;
        Some(options.template_output.clone())
    };

    Ok(PackageOutcome {
        config,
        descriptor,
        template: rendered,
        archive,
        template_file,
    })
}

/// Label the source and add third-party image resources.
///
/// A missing security config skips this step.
fn add_security_metadata(
    reader: &impl FileReader,
    security_config_path: &str,
    manifest_path: &Path,
    builder: &mut DescriptorBuilder,
) -> Result<()> {
    if security_config_path.is_empty() {
        info!("no security config, skipping security scan metadata");
        return Ok(());
    }

    let security_config = match security::parse(reader, Path::new(security_config_path)) {
        Ok(parsed) => parsed,
        Err(err @ ModulectlError::SecurityConfigFileDoesNotExist { .. }) => {
            warn!("{err}, skipping security scan metadata");
            return Ok(());
        }
        Err(err) => return Err(err.wrap("failed to parse security config")),
    };

    let parser = YamlManifestParser::new(OsFileReader);
    let images = extract_images(&parser, manifest_path)
        .context("failed to extract images from manifest")?;

    append_security_scan_config(builder, &security_config, &images)
        .context("failed to append security scan config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::ResourceInput;
    use crate::git::Git2Client;
    use crate::test_fixtures::{create_git_repo_with_commit, create_temp_dir};
    use tempfile::TempDir;

    const MANIFEST: &str = r"apiVersion: apps/v1
kind: Deployment
metadata:
  name: manager
spec:
  template:
    spec:
      containers:
        - name: manager
          image: europe-docker.pkg.dev/kyma-project/prod/template-operator:1.0.0
";

    fn module_dir(extra_config: &str) -> TempDir {
        let temp = create_temp_dir();
        std::fs::write(temp.path().join("manifest.yaml"), MANIFEST).unwrap();
        std::fs::write(
            temp.path().join("module-config.yaml"),
            format!(
                "name: github.com/kyma-project/mod\nversion: 1.0.0\nchannel: regular\nmanifest: manifest.yaml\n{extra_config}"
            ),
        )
        .unwrap();
        temp
    }

    fn options(dir: &Path, git_remote: &Path) -> PackageOptions {
        PackageOptions {
            config_file: dir.join("module-config.yaml"),
            output: dir.join("component-archive"),
            template_output: dir.join("template.yaml"),
            git_remote: Some(git_remote.display().to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_module() {
        let (_repo, repo_path, head) = create_git_repo_with_commit();
        let dir = module_dir("");
        let mut git = GitSourceProvider::new(Git2Client);

        let outcome = run(&options(dir.path(), &repo_path), &mut git).unwrap();

        let component = &outcome.descriptor.component;
        assert_eq!(component.resources.len(), 3);
        assert_eq!(component.sources.len(), 1);
        assert!(matches!(
            &component.sources[0].access,
            crate::descriptor::Access::GitHub { commit, .. } if *commit == head
        ));
        assert!(dir.path().join("component-archive/component-descriptor.yaml").is_file());
        assert!(dir.path().join("template.yaml").is_file());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_repo, repo_path, _) = create_git_repo_with_commit();
        let dir = module_dir("");
        let mut git = GitSourceProvider::new(Git2Client);
        let mut options = options(dir.path(), &repo_path);
        options.dry_run = true;

        let outcome = run(&options, &mut git).unwrap();
        assert!(outcome.archive.is_none());
        assert!(outcome.template_file.is_none());
        assert!(!dir.path().join("component-archive").exists());
        assert!(!dir.path().join("template.yaml").exists());
        assert!(outcome.template.contains("kind: ModuleTemplate"));
    }

    fn metadata_content(outcome: &PackageOutcome) -> String {
        let metadata = outcome.descriptor.resource(resources::METADATA_RESOURCE).unwrap();
        match &metadata.input {
            Some(ResourceInput::PlainText { content, .. }) => content.clone(),
            other => panic!("unexpected metadata input {other:?}"),
        }
    }

    #[test]
    fn test_metadata_keeps_config_as_written() {
        let (_repo, repo_path, _) = create_git_repo_with_commit();
        let first = module_dir("");
        let second = module_dir("");
        let mut git = GitSourceProvider::new(Git2Client);

        let mut first_options = options(first.path(), &repo_path);
        first_options.dry_run = true;
        let mut second_options = options(second.path(), &repo_path);
        second_options.dry_run = true;

        let first_metadata = metadata_content(&run(&first_options, &mut git).unwrap());
        let second_metadata = metadata_content(&run(&second_options, &mut git).unwrap());

        assert!(first_metadata.contains("manifest: manifest.yaml"));
        assert!(!first_metadata.contains(&first.path().display().to_string()));
        assert_eq!(first_metadata, second_metadata);
    }

    #[test]
    fn test_security_config_and_registry() {
        let (_repo, repo_path, _) = create_git_repo_with_commit();
        let dir = module_dir("security: sec-scanners-config.yaml\n");
        std::fs::write(
            dir.path().join("sec-scanners-config.yaml"),
            "rcTag: 1.0.0\ndevBranch: main\nmend:\n  language: golang-mod\n  subProjects: \"false\"\n",
        )
        .unwrap();
        let mut git = GitSourceProvider::new(Git2Client);
        let mut options = options(dir.path(), &repo_path);
        options.registry = Some("http://localhost:5001".to_string());

        let outcome = run(&options, &mut git).unwrap();
        let component = &outcome.descriptor.component;

        assert_eq!(component.sources[0].labels.len(), 6);
        let image = outcome.descriptor.resource("template-operator").unwrap();
        assert_eq!(image.version, "1.0.0");
        assert_eq!(component.repository_contexts[0].base_url, "http://localhost:5001");
        assert!(matches!(
            &outcome.descriptor.resource(MODULE_IMAGE_RESOURCE).unwrap().access,
            Some(crate::descriptor::Access::OciArtifact { image_reference })
                if image_reference == "localhost:5001/component-descriptors/github.com/kyma-project/mod:1.0.0"
        ));
    }

    #[test]
    fn test_missing_security_config_is_skipped() {
        let (_repo, repo_path, _) = create_git_repo_with_commit();
        let dir = module_dir("security: sec-scanners-config.yaml\n");
        let mut git = GitSourceProvider::new(Git2Client);

        let outcome = run(&options(dir.path(), &repo_path), &mut git).unwrap();
        assert_eq!(outcome.descriptor.component.sources[0].labels.len(), 1);
        assert_eq!(outcome.descriptor.component.resources.len(), 3);
    }

    #[test]
    fn test_invalid_config_stops_pipeline() {
        let (_repo, repo_path, _) = create_git_repo_with_commit();
        let dir = create_temp_dir();
        std::fs::write(
            dir.path().join("module-config.yaml"),
            "name: github.com/kyma-project/mod\nversion: 1.0.0\nchannel: X\nmanifest: manifest.yaml\n",
        )
        .unwrap();
        let mut git = GitSourceProvider::new(Git2Client);

        let err = run(&options(dir.path(), &repo_path), &mut git).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("failed to validate module config: failed to validate module channel"));
        assert!(!dir.path().join("component-archive").exists());
    }

    #[test]
    fn test_repository_is_required() {
        let dir = module_dir("");
        let mut git = GitSourceProvider::new(Git2Client);
        let mut options = options(dir.path(), Path::new(""));
        options.git_remote = None;

        let err = run(&options, &mut git).unwrap_err();
        assert!(matches!(err, ModulectlError::ConfigInvalid { .. }));
    }
}
