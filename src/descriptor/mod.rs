//! OCM component descriptor (schema v2)
//!
//! A descriptor lists the resources and sources of one module version:
//!
//! ```yaml
//! meta:
//!   schemaVersion: v2
//! component:
//!   name: kyma-project.io/module/template-operator
//!   version: 1.0.0
//!   provider: kyma-project.io
//!   repositoryContexts: []
//!   resources: [...]
//!   sources: [...]
//!   componentReferences: []
//! ```
//!
//! Descriptors are only produced through [`DescriptorBuilder::build`], which
//! validates them, so an unvalidated descriptor never leaves this module.

mod builder;
mod label;
mod validate;

pub use builder::DescriptorBuilder;
pub use label::{LABEL_VERSION, Label, LabelValue};
pub use validate::validate;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::blob::ResourceInput;
use crate::error::Result;

/// Descriptor schema version
pub const SCHEMA_VERSION: &str = "v2";

/// Provider recorded on every descriptor
pub const PROVIDER: &str = "kyma-project.io";

/// A complete component descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub meta: Meta,
    pub component: Component,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub schema_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    pub version: String,
    pub provider: String,
    #[serde(default)]
    pub repository_contexts: Vec<RepositoryContext>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub component_references: Vec<ComponentReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

/// Where the component is stored once pushed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryContext {
    #[serde(rename = "type")]
    pub context_type: String,
    pub base_url: String,
    pub component_name_mapping: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentReference {
    pub name: String,
    pub component_name: String,
    pub version: String,
}

/// Whether a resource's bytes live in the archive or elsewhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Local,
    External,
}

/// How to reach the bytes of a resource or source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Access {
    #[serde(rename = "ociArtifact")]
    OciArtifact {
        #[serde(rename = "imageReference")]
        image_reference: String,
    },
    #[serde(rename = "localBlob")]
    LocalBlob {
        #[serde(rename = "localReference")]
        local_reference: String,
        #[serde(rename = "mediaType")]
        media_type: String,
    },
    #[serde(rename = "gitHub")]
    GitHub {
        #[serde(rename = "repoUrl")]
        repo_url: String,
        commit: String,
    },
}

/// An artifact described by the component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub version: String,
    /// Identity attributes beyond name and version
    #[serde(
        rename = "extraIdentity",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub extra_identity: BTreeMap<String, String>,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub relation: Relation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    /// Content still to be written to the archive as a local blob
    #[serde(skip)]
    pub input: Option<ResourceInput>,
}

/// Provenance of the component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    pub access: Access,
}

impl Resource {
    /// Find a label by name
    pub fn label(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.name == name)
    }
}

impl Source {
    /// Find a label by name
    pub fn label(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.name == name)
    }
}

impl ComponentDescriptor {
    /// Find a resource by name
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.component.resources.iter().find(|r| r.name == name)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse from YAML and validate
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let descriptor: Self = serde_yaml::from_str(yaml)?;
        validate(&descriptor)?;
        Ok(descriptor)
    }
}

/// Compose resources and sources into a validated descriptor
pub fn assemble(
    name: &str,
    version: &str,
    resources: Vec<Resource>,
    sources: Vec<Source>,
) -> Result<ComponentDescriptor> {
    let mut builder = DescriptorBuilder::new(name, version);
    builder.add_resources(resources);
    for source in sources {
        builder.add_source(source);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn external_image(name: &str, version: &str) -> Resource {
        Resource {
            name: name.to_string(),
            version: version.to_string(),
            extra_identity: BTreeMap::new(),
            resource_type: "ociArtifact".to_string(),
            relation: Relation::External,
            labels: vec![],
            access: Some(Access::OciArtifact {
                image_reference: format!("europe-docker.pkg.dev/kyma-project/prod/{name}:{version}"),
            }),
            input: None,
        }
    }

    #[test]
    fn test_assemble_sets_identity() {
        let descriptor = assemble(
            "kyma-project.io/module/template-operator",
            "1.0.0",
            vec![external_image("template-operator", "1.0.0")],
            vec![],
        )
        .unwrap();

        assert_eq!(descriptor.meta.schema_version, SCHEMA_VERSION);
        assert_eq!(descriptor.component.provider, PROVIDER);
        assert_eq!(descriptor.component.resources.len(), 1);
    }

    #[test]
    fn test_assemble_surfaces_validation_failure() {
        let err = assemble("not a component", "1.0.0", vec![], vec![]).unwrap_err();
        assert!(matches!(err, crate::error::ModulectlError::DescriptorInvalid { .. }));
        assert!(err.to_string().contains("component name"));
    }

    #[test]
    fn test_access_yaml_shapes() {
        let access = Access::LocalBlob {
            local_reference: "sha256.abc".to_string(),
            media_type: "application/x-tar".to_string(),
        };
        let yaml = serde_yaml::to_string(&access).unwrap();
        assert_eq!(
            yaml,
            "type: localBlob\nlocalReference: sha256.abc\nmediaType: application/x-tar\n"
        );

        let access: Access = serde_yaml::from_str(
            "type: gitHub\nrepoUrl: https://github.com/kyma-project/mod\ncommit: abc\n",
        )
        .unwrap();
        assert!(matches!(access, Access::GitHub { ref commit, .. } if commit == "abc"));
    }

    #[test]
    fn test_resource_without_access_omits_field() {
        let mut resource = external_image("module-image", "1.0.0");
        resource.access = None;
        let yaml = serde_yaml::to_string(&resource).unwrap();
        assert!(!yaml.contains("access"));
        assert!(yaml.contains("relation: external"));
    }

    #[test]
    fn test_from_yaml_validates() {
        let yaml = "meta:\n  schemaVersion: v2\ncomponent:\n  name: kyma-project.io/module/x\n  version: not-a-version\n  provider: kyma-project.io\n";
        let err = ComponentDescriptor::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("version"));
    }
}
