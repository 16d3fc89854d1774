//! Container image reference parsing and validation.
//!
//! Parses references like `europe-docker.pkg.dev/kyma-project/prod/template-operator:1.0.0`
//! into the image name (last path segment) and its tag or digest.
//!
//! Two levels of checking exist:
//! - [`has_valid_format`] is a cheap shape check; failing it is not an error.
//! - [`ImageInfo::parse`] is the semantic parse and reports *why* a reference is bad.
//!
//! [`is_valid`] combines both and additionally rejects disallowed tags. The
//! bare parser accepts `latest` so scaffolding content can still be read.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ImageError;

const MIN_REFERENCE_LEN: usize = 3;
const MAX_REFERENCE_LEN: usize = 256;

/// Tags that must never reach a shipped artifact (compared case-insensitively)
const DISALLOWED_TAGS: [&str; 2] = ["latest", "main"];

/// Prefix that turns a sha256 digest into a valid semantic version
const DIGEST_VERSION_PREFIX: &str = "0.0.0+sha256.";

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])(?:\.(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]))*(?::[0-9]+)?$",
    )
    .expect("domain regex is valid")
});

static PATH_COMPONENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*$").expect("path regex is valid")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w[\w.-]{0,127}$").expect("tag regex is valid"));

static DIGEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sha256:[a-f0-9]{64}$").expect("digest regex is valid"));

/// Parsed container image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    /// Last path segment of the repository (e.g. "template-operator")
    pub name: String,
    /// Registry and repository path without tag or digest
    /// (e.g. "ghcr.io/org/template-operator")
    pub repository: String,
    /// Tag, if the reference has one
    pub tag: Option<String>,
    /// Digest including the algorithm (e.g. "sha256:abc..."), if pinned
    pub digest: Option<String>,
    /// The reference exactly as given
    pub full_url: String,
}

impl ImageInfo {
    /// Parse an image reference.
    ///
    /// Supports:
    /// - `nginx:1.25`
    /// - `ghcr.io/org/image:tag`
    /// - `localhost:5000/org/image:tag`
    /// - `ghcr.io/org/image@sha256:<64 hex>`
    /// - `ghcr.io/org/image:tag@sha256:<64 hex>`
    ///
    /// Unlike most registries, a missing tag does not default to `latest`:
    /// such a reference fails with [`ImageError::NoTagOrDigest`].
    pub fn parse(reference: &str) -> Result<Self, ImageError> {
        if reference.is_empty() || reference.chars().any(char::is_whitespace) {
            return Err(ImageError::InvalidFormat {
                image: reference.to_string(),
                reason: "reference is empty or contains whitespace".to_string(),
            });
        }

        let (name_tag, digest) = match reference.split_once('@') {
            Some((name_tag, digest)) => {
                if !DIGEST_RE.is_match(digest) {
                    return Err(ImageError::InvalidFormat {
                        image: reference.to_string(),
                        reason: format!("unsupported digest '{digest}', expected sha256:<hex>"),
                    });
                }
                (name_tag, Some(digest.to_string()))
            }
            None => (reference, None),
        };

        // A colon only separates a tag when it follows the last slash;
        // otherwise it belongs to a registry port.
        let last_slash = name_tag.rfind('/').map_or(0, |pos| pos + 1);
        let (path, tag) = match name_tag[last_slash..].rfind(':') {
            Some(colon) => {
                let split = last_slash + colon;
                let tag = &name_tag[split + 1..];
                if !TAG_RE.is_match(tag) {
                    return Err(ImageError::InvalidFormat {
                        image: reference.to_string(),
                        reason: format!("invalid tag '{tag}'"),
                    });
                }
                (&name_tag[..split], Some(tag.to_string()))
            }
            None => (name_tag, None),
        };

        let name = repository_name(reference, path)?;

        if tag.is_none() && digest.is_none() {
            return Err(ImageError::NoTagOrDigest {
                image: reference.to_string(),
            });
        }

        Ok(ImageInfo {
            name,
            repository: path.to_string(),
            tag,
            digest,
            full_url: reference.to_string(),
        })
    }

    /// The digest when pinned, otherwise the tag
    pub fn tag_or_digest(&self) -> &str {
        self.digest
            .as_deref()
            .or(self.tag.as_deref())
            .unwrap_or_default()
    }

    /// Version to record on a descriptor resource for this image.
    ///
    /// Tags are used verbatim. Digest-pinned images get `0.0.0+sha256.<hex>`.
    pub fn resource_version(&self) -> String {
        match &self.digest {
            Some(digest) => {
                let hex = digest.strip_prefix("sha256:").unwrap_or(digest);
                format!("{DIGEST_VERSION_PREFIX}{hex}")
            }
            None => self.tag.clone().unwrap_or_default(),
        }
    }
}

/// Validate the repository path and return its last segment
fn repository_name(reference: &str, path: &str) -> Result<String, ImageError> {
    let name_error = || ImageError::ImageNameExtraction {
        image: reference.to_string(),
    };

    let mut components: Vec<&str> = path.split('/').collect();
    if components.iter().any(|c| c.is_empty()) {
        return Err(name_error());
    }

    if components.len() > 1 {
        let first = components[0];
        if first.contains('.') || first.contains(':') || first == "localhost" {
            if !DOMAIN_RE.is_match(first) {
                return Err(ImageError::InvalidFormat {
                    image: reference.to_string(),
                    reason: format!("invalid registry '{first}'"),
                });
            }
            components.remove(0);
        }
    }

    if !components.iter().all(|c| PATH_COMPONENT_RE.is_match(c)) {
        return Err(name_error());
    }

    components
        .last()
        .map(|name| (*name).to_string())
        .ok_or_else(name_error)
}

/// Parse a reference into `(name, tag_or_digest)`
pub fn parse(reference: &str) -> Result<(String, String), ImageError> {
    let info = ImageInfo::parse(reference)?;
    let tag_or_digest = info.tag_or_digest().to_string();
    Ok((info.name, tag_or_digest))
}

/// Cheap shape check run before any semantic parsing
pub fn has_valid_format(reference: &str) -> bool {
    let len = reference.chars().count();
    (MIN_REFERENCE_LEN..=MAX_REFERENCE_LEN).contains(&len)
        && !reference.chars().any(char::is_whitespace)
        && (reference.contains(':') || reference.contains('@'))
}

/// Check whether a reference may be shipped in a module artifact.
///
/// Returns `Ok(false)` when the reference does not even look like an image,
/// and an error when it looks like one but is malformed or uses a
/// disallowed tag.
pub fn is_valid(reference: &str) -> Result<bool, ImageError> {
    if !has_valid_format(reference) {
        return Ok(false);
    }

    let info = ImageInfo::parse(reference)?;
    if let Some(tag) = &info.tag {
        if is_disallowed_tag(tag) {
            return Err(ImageError::DisallowedTag {
                image: reference.to_string(),
                tag: tag.clone(),
            });
        }
    }

    Ok(true)
}

fn is_disallowed_tag(tag: &str) -> bool {
    DISALLOWED_TAGS
        .iter()
        .any(|disallowed| tag.eq_ignore_ascii_case(disallowed))
}
