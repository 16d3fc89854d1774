//! Descriptor builder
//!
//! All mutation of a descriptor happens on the builder; `build` fills derived
//! defaults and runs schema validation once, as the terminal step.

use tracing::debug;

use super::{
    Component, ComponentDescriptor, Meta, PROVIDER, RepositoryContext, Resource, SCHEMA_VERSION,
    Source, validate,
};
use crate::error::Result;

/// Accumulates resources, sources and labels for one packaging run
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    descriptor: ComponentDescriptor,
}

impl DescriptorBuilder {
    /// Start a descriptor for `name` at `version`
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            descriptor: ComponentDescriptor {
                meta: Meta {
                    schema_version: SCHEMA_VERSION.to_string(),
                },
                component: Component {
                    name: name.into(),
                    version: version.into(),
                    provider: PROVIDER.to_string(),
                    repository_contexts: Vec::new(),
                    resources: Vec::new(),
                    sources: Vec::new(),
                    component_references: Vec::new(),
                    labels: Vec::new(),
                },
            },
        }
    }

    /// Continue mutating an already built descriptor
    pub fn from_descriptor(descriptor: ComponentDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn add_resource(&mut self, resource: Resource) -> &mut Self {
        self.descriptor.component.resources.push(resource);
        self
    }

    pub fn add_resources(&mut self, resources: impl IntoIterator<Item = Resource>) -> &mut Self {
        self.descriptor.component.resources.extend(resources);
        self
    }

    pub fn add_source(&mut self, source: Source) -> &mut Self {
        self.descriptor.component.sources.push(source);
        self
    }

    pub fn add_repository_context(&mut self, context: RepositoryContext) -> &mut Self {
        self.descriptor.component.repository_contexts.push(context);
        self
    }

    pub fn resources(&self) -> &[Resource] {
        &self.descriptor.component.resources
    }

    pub fn resources_mut(&mut self) -> &mut [Resource] {
        &mut self.descriptor.component.resources
    }

    /// Look up a resource by name for in-place changes
    pub fn resource_mut(&mut self, name: &str) -> Option<&mut Resource> {
        self.descriptor
            .component
            .resources
            .iter_mut()
            .find(|r| r.name == name)
    }

    pub fn sources(&self) -> &[Source] {
        &self.descriptor.component.sources
    }

    pub fn sources_mut(&mut self) -> &mut [Source] {
        &mut self.descriptor.component.sources
    }

    /// Fill derived fields and validate.
    ///
    /// Resources and sources without a version inherit the component version.
    pub fn build(self) -> Result<ComponentDescriptor> {
        let mut descriptor = self.descriptor;
        let version = descriptor.component.version.clone();

        for resource in &mut descriptor.component.resources {
            if resource.version.is_empty() {
                resource.version.clone_from(&version);
            }
        }
        for source in &mut descriptor.component.sources {
            if source.version.is_empty() {
                source.version.clone_from(&version);
            }
        }

        validate(&descriptor)?;
        debug!(
            component = %descriptor.component.name,
            resources = descriptor.component.resources.len(),
            sources = descriptor.component.sources.len(),
            "component descriptor validated"
        );
        Ok(descriptor)
    }
}
