//! Security scan metadata for the component descriptor
//!
//! Scan settings travel as labels on the git source. Third-party images,
//! declared under `protecode` or discovered in the manifest, become external
//! `ociArtifact` resources labelled as third-party images.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use crate::config::SecurityScanConfig;
use crate::descriptor::{Access, DescriptorBuilder, Label, Relation, Resource, Source};
use crate::error::{ImageError, Result, ResultExt, descriptor};
use crate::image::{self, ImageInfo};
use crate::resources::OCI_ARTIFACT_TYPE;

pub const RC_TAG_LABEL: &str = "scan.security.kyma-project.io/rc-tag";
pub const LANGUAGE_LABEL: &str = "scan.security.kyma-project.io/language";
pub const DEV_BRANCH_LABEL: &str = "scan.security.kyma-project.io/dev-branch";
pub const SUBPROJECTS_LABEL: &str = "scan.security.kyma-project.io/subprojects";
pub const EXCLUDE_LABEL: &str = "scan.security.kyma-project.io/exclude";
pub const TYPE_LABEL: &str = "scan.security.kyma-project.io/type";

pub const THIRD_PARTY_IMAGE: &str = "third-party-image";

/// Extra identity keys telling apart images with the same name and version
pub const IMAGE_REPOSITORY_IDENTITY: &str = "imageRepository";
pub const IMAGE_REFERENCE_IDENTITY: &str = "imageReference";

/// Union of both lists without empty entries, in sorted order
pub fn merge_and_deduplicate(declared: &[String], discovered: &[String]) -> Vec<String> {
    declared
        .iter()
        .chain(discovered)
        .filter(|image| !image.is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Attach the scan labels to `source` in their fixed order
pub fn append_labels(source: &mut Source, config: &SecurityScanConfig) {
    source.labels.extend([
        Label::text(RC_TAG_LABEL, &config.rc_tag),
        Label::text(LANGUAGE_LABEL, &config.mend.language),
        Label::text(DEV_BRANCH_LABEL, &config.dev_branch),
        Label::text(SUBPROJECTS_LABEL, &config.mend.sub_projects),
        Label::text(EXCLUDE_LABEL, config.mend.exclude.join(",")),
    ]);
}

/// External resource for a third-party image
pub fn image_resource(reference: &str) -> Result<Resource> {
    Ok(third_party_resource(parse_image(reference)?))
}

fn parse_image(reference: &str) -> Result<ImageInfo> {
    if !image::is_valid(reference)? {
        return Err(ImageError::InvalidFormat {
            image: reference.to_string(),
            reason: "not an image reference".to_string(),
        }
        .into());
    }
    Ok(ImageInfo::parse(reference)?)
}

fn third_party_resource(info: ImageInfo) -> Resource {
    Resource {
        version: info.resource_version(),
        name: info.name,
        extra_identity: BTreeMap::new(),
        resource_type: OCI_ARTIFACT_TYPE.to_string(),
        relation: Relation::External,
        labels: vec![Label::text(TYPE_LABEL, THIRD_PARTY_IMAGE)],
        access: Some(Access::OciArtifact {
            image_reference: info.full_url,
        }),
        input: None,
    }
}

type Identity = (String, String, BTreeMap<String, String>);

fn identity(resource: &Resource) -> Identity {
    (
        resource.name.clone(),
        resource.version.clone(),
        resource.extra_identity.clone(),
    )
}

/// Label the git source and add a resource per third-party image.
///
/// `discovered` holds images found in the module manifest; they are merged
/// with the images declared in the config. Every distinct reference becomes
/// its own resource. When name and version collide with a resource already
/// present, the image repository is added as extra identity, and the full
/// reference as well if that still collides.
pub fn append_security_scan_config(
    builder: &mut DescriptorBuilder,
    config: &SecurityScanConfig,
    discovered: &[String],
) -> Result<()> {
    let Some(source) = builder.sources_mut().first_mut() else {
        return Err(descriptor::invalid("security scan labels require a git source"));
    };
    append_labels(source, config);

    let mut identities: HashSet<Identity> = builder.resources().iter().map(identity).collect();

    let images = merge_and_deduplicate(&config.protecode, discovered);
    for reference in &images {
        let info = parse_image(reference)
            .context(format!("failed to create resource for image {reference}"))?;
        let repository = info.repository.clone();
        let mut resource = third_party_resource(info);

        if identities.contains(&identity(&resource)) {
            resource.extra_identity.insert(IMAGE_REPOSITORY_IDENTITY.to_string(), repository);
        }
        if identities.contains(&identity(&resource)) {
            resource.extra_identity.insert(IMAGE_REFERENCE_IDENTITY.to_string(), reference.clone());
        }
        if !resource.extra_identity.is_empty() {
            debug!(image = %reference, "image shares name and version, adding extra identity");
        }

        identities.insert(identity(&resource));
        builder.add_resource(resource);
    }

    debug!(images = images.len(), "security scan metadata appended");
    Ok(())
}
