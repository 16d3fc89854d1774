//! Module configuration (module-config.yaml) data structures

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, config};
use crate::files::{FileReader, FileResolver};

/// Namespace used when the config does not set one
pub const DEFAULT_NAMESPACE: &str = "kcp-system";

/// Module configuration from module-config.yaml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    /// Module name (e.g., "kyma-project.io/module/template-operator")
    pub name: String,

    /// Strict semantic version of the module
    pub version: String,

    /// Release channel (e.g., "regular", "fast")
    pub channel: String,

    /// Namespace the ModuleTemplate is deployed to
    #[serde(default)]
    pub namespace: String,

    /// Path or URL of the rendered manifests
    #[serde(rename = "manifest")]
    pub manifest_path: String,

    /// Path or URL of the default custom resource
    #[serde(rename = "defaultCR", default, skip_serializing_if = "String::is_empty")]
    pub default_cr_path: String,

    /// Path or URL of the security scanners config
    #[serde(rename = "security", default, skip_serializing_if = "String::is_empty")]
    pub security_config_path: String,

    /// Name of the generated ModuleTemplate
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_name: String,

    /// Git remote of the module sources
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repository: String,

    #[serde(default)]
    pub mandatory: bool,

    #[serde(default)]
    pub internal: bool,

    #[serde(default)]
    pub beta: bool,

    /// Extra labels for the ModuleTemplate
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Extra annotations for the ModuleTemplate
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Resource indicating installation readiness, typically the manager deployment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<Manager>,
}

/// Reference to the module's manager resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Manager {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl ModuleConfig {
    /// Parse from YAML and apply defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.apply_defaults();
        Ok(config)
    }

    /// Read and parse the config file at `path`
    pub fn load(reader: &impl FileReader, path: &Path) -> Result<Self> {
        if !reader.file_exists(path) {
            return Err(config::not_found(path.display().to_string()));
        }
        let content = reader.read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&content)
            .map_err(|e| config::parse_failed(path.display().to_string(), e.to_string()))?;
        config.apply_defaults();
        debug!(name = %config.name, version = %config.version, "module config loaded");
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Last segment of the module name (e.g., "template-operator")
    pub fn short_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn apply_defaults(&mut self) {
        if self.namespace.is_empty() {
            self.namespace = DEFAULT_NAMESPACE.to_string();
        }
        if self.resource_name.is_empty() && !self.name.is_empty() && !self.channel.is_empty() {
            self.resource_name = format!("{}-{}", self.short_name(), self.channel);
        }
    }

    /// Rewrite manifest, default CR and security references to absolute local paths.
    ///
    /// Remote references are downloaded by `resolver`, which owns the temp files.
    pub fn resolve_paths(&mut self, resolver: &mut FileResolver) -> Result<()> {
        for reference in [
            &mut self.manifest_path,
            &mut self.default_cr_path,
            &mut self.security_config_path,
        ] {
            if reference.is_empty() {
                continue;
            }
            let resolved = resolver.resolve(reference)?;
            *reference = resolved.display().to_string();
        }
        Ok(())
    }
}
