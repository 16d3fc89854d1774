//! Container image discovery in rendered module manifests
//!
//! Images are taken from the pod templates of `Deployment` and `StatefulSet`
//! workloads: container images, init container images, and environment
//! variable values shaped like image references.

mod parser;

pub use parser::{ManifestParser, YamlManifestParser, split_documents};

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;
use tracing::debug;

use crate::error::{Result, ResultExt};
use crate::image;

const WORKLOAD_KINDS: [&str; 2] = ["Deployment", "StatefulSet"];

static ENV_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.-]+(?::[0-9]+)?/[a-z0-9._/-]+(?::\w[\w.-]{0,127}(?:@sha256:[a-f0-9]{64})?|@sha256:[a-f0-9]{64})$",
    )
    .expect("env image regex is valid")
});

/// Collect the distinct images referenced by workloads in a manifest.
///
/// Any image with a disallowed tag or a malformed reference aborts the whole
/// extraction; no partial list is returned.
pub fn extract_images(parser: &impl ManifestParser, manifest_path: &Path) -> Result<Vec<String>> {
    let documents = parser
        .parse(manifest_path)
        .context(format!("failed to parse manifest {}", manifest_path.display()))?;

    let mut images = BTreeSet::new();
    for document in documents.iter().filter(|d| is_workload(d)) {
        for candidate in workload_images(document) {
            if image::is_valid(&candidate)? {
                images.insert(candidate);
            }
        }
    }

    debug!(
        manifest = %manifest_path.display(),
        count = images.len(),
        "images extracted from manifest"
    );
    Ok(images.into_iter().collect())
}

fn is_workload(document: &Value) -> bool {
    let kind = document.get("kind").and_then(Value::as_str).unwrap_or_default();
    let api_version = document
        .get("apiVersion")
        .and_then(Value::as_str)
        .unwrap_or_default();
    !kind.is_empty() && !api_version.is_empty() && WORKLOAD_KINDS.contains(&kind)
}

fn workload_images(document: &Value) -> Vec<String> {
    let Some(pod_spec) = document
        .get("spec")
        .and_then(|s| s.get("template"))
        .and_then(|t| t.get("spec"))
    else {
        return Vec::new();
    };

    let mut images = Vec::new();
    for key in ["containers", "initContainers"] {
        let Some(containers) = pod_spec.get(key).and_then(Value::as_sequence) else {
            continue;
        };
        for container in containers {
            if let Some(image) = container.get("image").and_then(Value::as_str) {
                if !image.is_empty() {
                    images.push(image.to_string());
                }
            }
            images.extend(env_images(container));
        }
    }
    images
}

fn env_images(container: &Value) -> impl Iterator<Item = String> + '_ {
    container
        .get("env")
        .and_then(Value::as_sequence)
        .into_iter()
        .flatten()
        .filter_map(|env| env.get("value").and_then(Value::as_str))
        .filter(|value| ENV_IMAGE_RE.is_match(value))
        .map(str::to_string)
}
