//! Module resources for the component descriptor
//!
//! Every module ships the same set of resources, in this order:
//!
//! | name           | type          | relation | content                        |
//! |----------------|---------------|----------|--------------------------------|
//! | `module-image` | `ociArtifact` | external | set once the registry is known |
//! | `metadata`     | `plainText`   | local    | the module config as YAML      |
//! | `raw-manifest` | `directory`   | local    | tar of the manifest file       |
//! | `default-cr`   | `directory`   | local    | tar of the default CR, if any  |

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::blob::{ResourceInput, SingleFileArchive};
use crate::config::ModuleConfig;
use crate::descriptor::{Access, Label, Relation, RepositoryContext, Resource};
use crate::error::{Result, ResultExt};
use crate::selector;

pub const MODULE_IMAGE_RESOURCE: &str = "module-image";
pub const METADATA_RESOURCE: &str = "metadata";
pub const RAW_MANIFEST_RESOURCE: &str = "raw-manifest";
pub const DEFAULT_CR_RESOURCE: &str = "default-cr";

pub const OCI_ARTIFACT_TYPE: &str = "ociArtifact";
pub const PLAIN_TEXT_TYPE: &str = "plainText";
pub const DIRECTORY_TYPE: &str = "directory";

/// Label carrying the registry credential selector
pub const CREDENTIALS_LABEL: &str = "operator.kyma-project.io/oci-registry-cred";

/// Build the module's resources.
///
/// `default_cr_path` adds the `default-cr` resource when present. A non-empty
/// `credential_selector` labels every resource with its `matchLabels`; an
/// invalid selector fails the whole generation.
pub fn generate(
    config: &ModuleConfig,
    manifest_path: &Path,
    default_cr_path: Option<&Path>,
    credential_selector: &str,
) -> Result<Vec<Resource>> {
    let credentials = credentials_label(credential_selector)
        .context("failed to create credentials label")?;

    let mut resources = vec![
        Resource {
            name: MODULE_IMAGE_RESOURCE.to_string(),
            version: config.version.clone(),
            extra_identity: BTreeMap::new(),
            resource_type: OCI_ARTIFACT_TYPE.to_string(),
            relation: Relation::External,
            labels: Vec::new(),
            access: None,
            input: None,
        },
        Resource {
            name: METADATA_RESOURCE.to_string(),
            version: config.version.clone(),
            extra_identity: BTreeMap::new(),
            resource_type: PLAIN_TEXT_TYPE.to_string(),
            relation: Relation::Local,
            labels: Vec::new(),
            access: None,
            input: Some(ResourceInput::yaml(config.to_yaml()?)),
        },
        directory_resource(RAW_MANIFEST_RESOURCE, &config.version, manifest_path)
            .context("failed to create raw manifest resource")?,
    ];

    if let Some(path) = default_cr_path {
        resources.push(
            directory_resource(DEFAULT_CR_RESOURCE, &config.version, path)
                .context("failed to create default CR resource")?,
        );
    }

    if let Some(label) = credentials {
        for resource in &mut resources {
            resource.labels.push(label.clone());
        }
    }

    debug!(count = resources.len(), "module resources generated");
    Ok(resources)
}

fn directory_resource(name: &str, version: &str, path: &Path) -> Result<Resource> {
    let archive = SingleFileArchive::for_file(path)?;
    Ok(Resource {
        name: name.to_string(),
        version: version.to_string(),
        extra_identity: BTreeMap::new(),
        resource_type: DIRECTORY_TYPE.to_string(),
        relation: Relation::Local,
        labels: Vec::new(),
        access: None,
        input: Some(ResourceInput::Archive(archive)),
    })
}

/// Label holding the selector's `matchLabels`, or `None` for an empty selector
pub fn credentials_label(credential_selector: &str) -> Result<Option<Label>> {
    if credential_selector.is_empty() {
        return Ok(None);
    }
    let selector = selector::parse(credential_selector)?;
    Ok(Some(Label::map(CREDENTIALS_LABEL, selector.match_labels)))
}

/// Registry location of the module image for `name` at `version`
pub fn module_image_reference(registry: &str, name: &str, version: &str) -> String {
    let host = registry
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("{host}/component-descriptors/{name}:{version}")
}

/// Point the module image at `registry`
pub fn module_image_access(registry: &str, name: &str, version: &str) -> Access {
    Access::OciArtifact {
        image_reference: module_image_reference(registry, name, version),
    }
}

/// Repository context describing where the component is pushed
pub fn registry_context(registry: &str) -> RepositoryContext {
    RepositoryContext {
        context_type: "OCIRegistry".to_string(),
        base_url: registry.trim_end_matches('/').to_string(),
        component_name_mapping: "urlPath".to_string(),
    }
}
