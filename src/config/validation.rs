//! Module config validation
//!
//! Each rule is usable on its own. [`validate_module_config`] runs them in a
//! fixed order and stops at the first failure, wrapping it with the name of
//! the field group that failed.

use std::sync::LazyLock;

use regex::Regex;

use super::{Manager, ModuleConfig};
use crate::error::{Result, ResultExt, config};

const MAX_NAME_LEN: usize = 255;
const MAX_NAMESPACE_LEN: usize = 253;
const MAX_RESOURCE_NAME_LEN: usize = 253;

static MODULE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-z][-a-z0-9]*([.][a-z][-a-z0-9]*)*[.][a-z]{2,}(/[a-z][-a-z0-9_]*([.][a-z][-a-z0-9_]*)*)+$",
    )
    .expect("module name regex is valid")
});

static CHANNEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{3,32}$").expect("channel regex is valid"));

static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("namespace regex is valid")
});

static DNS_SUBDOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("dns subdomain regex is valid")
});

/// Validate every field group, stopping at the first failure
pub fn validate_module_config(config: &ModuleConfig) -> Result<()> {
    validate_name(&config.name).context("failed to validate module name")?;
    validate_version(&config.version).context("failed to validate module version")?;
    validate_channel(&config.channel).context("failed to validate module channel")?;
    validate_namespace(&config.namespace).context("failed to validate module namespace")?;
    validate_resource_name(&config.resource_name)
        .context("failed to validate module resource name")?;
    if let Some(manager) = &config.manager {
        validate_manager(manager).context("failed to validate module manager")?;
    }
    Ok(())
}

/// Name: `host.tld/path/segments`, at most 255 characters
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(config::invalid("name", "must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(config::invalid(
            "name",
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    if !MODULE_NAME_RE.is_match(name) {
        return Err(config::invalid(
            "name",
            format!("'{name}' must match the pattern domain.tld/path, e.g. kyma-project.io/module/sample"),
        ));
    }
    Ok(())
}

/// Version: strict semantic version
pub fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() {
        return Err(config::invalid("version", "must not be empty"));
    }
    semver::Version::parse(version).map_err(|e| {
        config::invalid(
            "version",
            format!("'{version}' is not a valid semantic version: {e}"),
        )
    })?;
    Ok(())
}

/// Channel: 3 to 32 lowercase letters
pub fn validate_channel(channel: &str) -> Result<()> {
    if channel.is_empty() {
        return Err(config::invalid("channel", "must not be empty"));
    }
    if !CHANNEL_RE.is_match(channel) {
        return Err(config::invalid(
            "channel",
            format!("'{channel}' must be 3 to 32 lowercase letters"),
        ));
    }
    Ok(())
}

/// Namespace: lowercase alphanumerics separated by single hyphens
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(config::invalid("namespace", "must not be empty"));
    }
    if namespace.len() > MAX_NAMESPACE_LEN {
        return Err(config::invalid(
            "namespace",
            format!("must be at most {MAX_NAMESPACE_LEN} characters"),
        ));
    }
    if !NAMESPACE_RE.is_match(namespace) {
        return Err(config::invalid(
            "namespace",
            format!("'{namespace}' must be lowercase alphanumerics separated by single hyphens"),
        ));
    }
    Ok(())
}

/// Resource name: optional DNS-1123 subdomain
pub fn validate_resource_name(resource_name: &str) -> Result<()> {
    if resource_name.is_empty() {
        return Ok(());
    }
    if resource_name.len() > MAX_RESOURCE_NAME_LEN || !DNS_SUBDOMAIN_RE.is_match(resource_name) {
        return Err(config::invalid(
            "resourceName",
            format!("'{resource_name}' must be a lowercase DNS subdomain of at most {MAX_RESOURCE_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

/// Manager: name, group, version and kind are required
pub fn validate_manager(manager: &Manager) -> Result<()> {
    for (field, value) in [
        ("manager.name", &manager.name),
        ("manager.group", &manager.group),
        ("manager.version", &manager.version),
        ("manager.kind", &manager.kind),
    ] {
        if value.is_empty() {
            return Err(config::invalid(field, "must not be empty"));
        }
    }
    if !manager.namespace.is_empty() {
        validate_namespace(&manager.namespace).map_err(|_| {
            config::invalid(
                "manager.namespace",
                format!("'{}' is not a valid namespace", manager.namespace),
            )
        })?;
    }
    Ok(())
}
