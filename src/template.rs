//! ModuleTemplate rendering
//!
//! The ModuleTemplate is the Kubernetes resource that carries a module's
//! component descriptor into the cluster.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::Value;

use crate::config::{Manager, ModuleConfig};
use crate::descriptor::ComponentDescriptor;
use crate::error::{Result, config as config_error};

pub const API_VERSION: &str = "operator.kyma-project.io/v1beta2";
pub const KIND: &str = "ModuleTemplate";

pub const MODULE_NAME_LABEL: &str = "operator.kyma-project.io/module-name";
pub const INTERNAL_LABEL: &str = "operator.kyma-project.io/internal";
pub const BETA_LABEL: &str = "operator.kyma-project.io/beta";
pub const MODULE_VERSION_ANNOTATION: &str = "operator.kyma-project.io/module-version";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTemplate<'a> {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: Metadata,
    pub spec: Spec<'a>,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct Spec<'a> {
    pub channel: String,
    pub mandatory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub descriptor: &'a ComponentDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<&'a Manager>,
}

impl<'a> ModuleTemplate<'a> {
    /// Assemble the template for `config` wrapping `descriptor`.
    ///
    /// `default_cr` is the raw YAML of the default custom resource.
    pub fn new(
        config: &'a ModuleConfig,
        descriptor: &'a ComponentDescriptor,
        default_cr: Option<&str>,
    ) -> Result<Self> {
        let mut labels = BTreeMap::from([(
            MODULE_NAME_LABEL.to_string(),
            config.short_name().to_string(),
        )]);
        if config.internal {
            labels.insert(INTERNAL_LABEL.to_string(), "true".to_string());
        }
        if config.beta {
            labels.insert(BETA_LABEL.to_string(), "true".to_string());
        }
        labels.extend(config.labels.clone());

        let mut annotations = BTreeMap::from([(
            MODULE_VERSION_ANNOTATION.to_string(),
            config.version.clone(),
        )]);
        annotations.extend(config.annotations.clone());

        let data = default_cr
            .map(|content| {
                serde_yaml::from_str::<Value>(content)
                    .map_err(|e| config_error::parse_failed("defaultCR", e.to_string()))
            })
            .transpose()?;

        Ok(Self {
            api_version: API_VERSION,
            kind: KIND,
            metadata: Metadata {
                name: config.resource_name.clone(),
                namespace: config.namespace.clone(),
                labels,
                annotations,
            },
            spec: Spec {
                channel: config.channel.clone(),
                mandatory: config.mandatory,
                data,
                descriptor,
                manager: config.manager.as_ref(),
            },
        })
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Render the ModuleTemplate YAML
pub fn render(
    config: &ModuleConfig,
    descriptor: &ComponentDescriptor,
    default_cr: Option<&str>,
) -> Result<String> {
    ModuleTemplate::new(config, descriptor, default_cr)?.to_yaml()
}
