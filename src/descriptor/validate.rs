//! Schema validation for component descriptors
//!
//! Mirrors the constraints of the OCM v2 JSON schema that matter for module
//! descriptors. Every violation is collected so one run reports all of them.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::{Access, ComponentDescriptor, Label, Relation, Resource, SCHEMA_VERSION, Source};
use crate::error::{Result, descriptor};

const MAX_COMPONENT_NAME_LEN: usize = 255;

static COMPONENT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-z][-a-z0-9]*([.][a-z][-a-z0-9]*)*[.][a-z]{2,}(/[a-z][-a-z0-9_]*([.][a-z][-a-z0-9_]*)*)+$",
    )
    .expect("component name regex is valid")
});

static IDENTITY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-_+.a-z0-9]*[a-z0-9])?$").expect("identity name regex is valid")
});

static RELAXED_SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[v]?(0|[1-9]\d*)(?:\.(0|[1-9]\d*))?(?:\.(0|[1-9]\d*))?(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    )
    .expect("semver regex is valid")
});

/// Validate a descriptor, reporting every violation found
pub fn validate(descriptor: &ComponentDescriptor) -> Result<()> {
    let mut violations = Vec::new();
    let component = &descriptor.component;

    if descriptor.meta.schema_version != SCHEMA_VERSION {
        violations.push(format!(
            "unsupported schema version '{}'",
            descriptor.meta.schema_version
        ));
    }

    if component.name.len() > MAX_COMPONENT_NAME_LEN || !COMPONENT_NAME_RE.is_match(&component.name)
    {
        violations.push(format!("invalid component name '{}'", component.name));
    }
    if !RELAXED_SEMVER_RE.is_match(&component.version) {
        violations.push(format!("invalid component version '{}'", component.version));
    }
    if component.provider.is_empty() {
        violations.push("component provider must not be empty".to_string());
    }
    for context in &component.repository_contexts {
        if context.base_url.is_empty() {
            violations.push("repository context baseUrl must not be empty".to_string());
        }
    }

    check_labels("component", &component.labels, &mut violations);

    let mut resource_ids = HashSet::new();
    for resource in &component.resources {
        check_resource(resource, &mut violations);
        let identity = (
            resource.name.as_str(),
            resource.version.as_str(),
            &resource.extra_identity,
        );
        if !resource_ids.insert(identity) {
            violations.push(format!(
                "duplicate resource identity {}:{}{}",
                resource.name,
                resource.version,
                format_extra_identity(&resource.extra_identity)
            ));
        }
    }

    let mut source_ids = HashSet::new();
    for source in &component.sources {
        check_source(source, &mut violations);
        if !source_ids.insert((source.name.as_str(), source.version.as_str())) {
            violations.push(format!(
                "duplicate source identity {}:{}",
                source.name, source.version
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(descriptor::invalid(violations.join("; ")))
    }
}

fn check_resource(resource: &Resource, violations: &mut Vec<String>) {
    let element = format!("resource '{}'", resource.name);
    check_identity(&element, &resource.name, &resource.version, violations);

    if resource.resource_type.is_empty() {
        violations.push(format!("{element}: type must not be empty"));
    }
    for key in resource.extra_identity.keys() {
        if key.is_empty() || key == "name" || key == "version" {
            violations.push(format!("{element}: invalid extraIdentity key '{key}'"));
        }
    }
    if let Some(Access::LocalBlob { .. }) = resource.access {
        if resource.relation != Relation::Local {
            violations.push(format!("{element}: localBlob access requires relation local"));
        }
    }
    if let Some(Access::GitHub { .. }) = resource.access {
        violations.push(format!("{element}: gitHub access is only valid on sources"));
    }

    check_labels(&element, &resource.labels, violations);
}

fn format_extra_identity(extra: &BTreeMap<String, String>) -> String {
    if extra.is_empty() {
        return String::new();
    }
    let pairs: Vec<_> = extra.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!(" ({})", pairs.join(","))
}

fn check_source(source: &Source, violations: &mut Vec<String>) {
    let element = format!("source '{}'", source.name);
    check_identity(&element, &source.name, &source.version, violations);

    if source.source_type.is_empty() {
        violations.push(format!("{element}: type must not be empty"));
    }
    match &source.access {
        Access::GitHub { repo_url, commit } => {
            if repo_url.is_empty() || commit.is_empty() {
                violations.push(format!("{element}: gitHub access needs repoUrl and commit"));
            }
        }
        _ => violations.push(format!("{element}: access must be of type gitHub")),
    }

    check_labels(&element, &source.labels, violations);
}

fn check_identity(element: &str, name: &str, version: &str, violations: &mut Vec<String>) {
    if !IDENTITY_NAME_RE.is_match(name) {
        violations.push(format!("{element}: invalid name"));
    }
    if !RELAXED_SEMVER_RE.is_match(version) {
        violations.push(format!("{element}: invalid version '{version}'"));
    }
}

fn check_labels(element: &str, labels: &[Label], violations: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for label in labels {
        if label.name.is_empty() {
            violations.push(format!("{element}: label name must not be empty"));
        } else if !seen.insert(label.name.as_str()) {
            violations.push(format!("{element}: duplicate label '{}'", label.name));
        }
    }
}
