//! Component archive on the local file system
//!
//! Layout:
//!
//! ```text
//! <dir>/
//! ├── component-descriptor.yaml
//! └── blobs/
//!     └── sha256.<hex>
//! ```
//!
//! Writes are not transactional. When a later step fails, blobs written so
//! far stay in place.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::descriptor::{Access, ComponentDescriptor, DescriptorBuilder};
use crate::error::{Result, ResultExt, descriptor, fs as fs_error};

pub const DESCRIPTOR_FILE: &str = "component-descriptor.yaml";
pub const BLOBS_DIR: &str = "blobs";

/// Content address of a blob, as used for its file name and local reference
pub fn blob_digest(bytes: &[u8]) -> String {
    format!("sha256.{}", hex::encode(Sha256::digest(bytes)))
}

/// A component archive directory
#[derive(Debug, Clone)]
pub struct ComponentArchive {
    root: PathBuf,
}

impl ComponentArchive {
    /// Create the archive at `dir` and write the initial descriptor.
    ///
    /// An existing archive is only replaced when `overwrite` is set.
    pub fn create(dir: &Path, descriptor: &ComponentDescriptor, overwrite: bool) -> Result<Self> {
        if dir.join(DESCRIPTOR_FILE).exists() {
            if !overwrite {
                return Err(descriptor::archive_exists(dir.display().to_string()));
            }
            fs::remove_dir_all(dir)
                .map_err(|e| fs_error::write_failed(dir.display().to_string(), e.to_string()))?;
        }

        let blobs = dir.join(BLOBS_DIR);
        fs::create_dir_all(&blobs)
            .map_err(|e| fs_error::write_failed(blobs.display().to_string(), e.to_string()))?;

        let archive = Self {
            root: dir.to_path_buf(),
        };
        archive.write_descriptor(descriptor)?;
        debug!(path = %dir.display(), "component archive created");
        Ok(archive)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(DESCRIPTOR_FILE)
    }

    pub fn blob_path(&self, digest: &str) -> PathBuf {
        self.root.join(BLOBS_DIR).join(digest)
    }

    /// Write the blob of every resource that carries local input and point
    /// its access at the blob. Returns the re-validated descriptor.
    pub fn add_module_resources(
        &self,
        descriptor: ComponentDescriptor,
    ) -> Result<ComponentDescriptor> {
        let mut builder = DescriptorBuilder::from_descriptor(descriptor);

        for resource in builder.resources_mut() {
            let Some(input) = resource.input.take() else {
                continue;
            };
            let bytes = input
                .to_bytes()
                .context(format!("failed to encode resource {}", resource.name))?;
            let digest = self.write_blob(&bytes)?;
            debug!(resource = %resource.name, blob = %digest, "blob written");

            resource.access = Some(Access::LocalBlob {
                local_reference: digest,
                media_type: input.media_type().to_string(),
            });
        }

        let descriptor = builder.build()?;
        self.write_descriptor(&descriptor)?;
        Ok(descriptor)
    }

    /// Store bytes under their content address, returning the digest
    pub fn write_blob(&self, bytes: &[u8]) -> Result<String> {
        let digest = blob_digest(bytes);
        let path = self.blob_path(&digest);
        fs::write(&path, bytes)
            .map_err(|e| fs_error::write_failed(path.display().to_string(), e.to_string()))?;
        Ok(digest)
    }

    pub fn write_descriptor(&self, descriptor: &ComponentDescriptor) -> Result<()> {
        let path = self.descriptor_path();
        fs::write(&path, descriptor.to_yaml()?)
            .map_err(|e| fs_error::write_failed(path.display().to_string(), e.to_string()))
    }

    /// Read back the descriptor stored in the archive
    pub fn read_descriptor(&self) -> Result<ComponentDescriptor> {
        let path = self.descriptor_path();
        let content = fs::read_to_string(&path)
            .map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;
        ComponentDescriptor::from_yaml(&content)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::blob::{ResourceInput, SingleFileArchive, TAR_MEDIA_TYPE, YAML_MEDIA_TYPE};
    use crate::descriptor::{Relation, Resource};
    use crate::error::ModulectlError;
    use tempfile::TempDir;

    fn descriptor_with_inputs(temp: &TempDir) -> ComponentDescriptor {
        let manifest = temp.path().join("manifest.yaml");
        std::fs::write(&manifest, "kind: Deployment\n").unwrap();

        let mut builder = DescriptorBuilder::new("github.com/kyma-project/mod", "1.0.0");
        builder.add_resources([
            Resource {
                name: "metadata".to_string(),
                version: "1.0.0".to_string(),
                extra_identity: BTreeMap::new(),
                resource_type: "plainText".to_string(),
                relation: Relation::Local,
                labels: Vec::new(),
                access: None,
                input: Some(ResourceInput::yaml("name: mod\n")),
            },
            Resource {
                name: "raw-manifest".to_string(),
                version: "1.0.0".to_string(),
                extra_identity: BTreeMap::new(),
                resource_type: "directory".to_string(),
                relation: Relation::Local,
                labels: Vec::new(),
                access: None,
                input: Some(ResourceInput::Archive(
                    SingleFileArchive::for_file(&manifest).unwrap(),
                )),
            },
        ]);
        builder.build().unwrap()
    }

    #[test]
    fn test_blob_digest() {
        assert_eq!(
            blob_digest(b""),
            "sha256.e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_create_and_add_resources() {
        let temp = TempDir::new().unwrap();
        let descriptor = descriptor_with_inputs(&temp);
        let dir = temp.path().join("archive");

        let archive = ComponentArchive::create(&dir, &descriptor, false).unwrap();
        assert!(dir.join(DESCRIPTOR_FILE).is_file());
        assert!(dir.join(BLOBS_DIR).is_dir());

        let descriptor = archive.add_module_resources(descriptor).unwrap();

        let metadata = descriptor.resource("metadata").unwrap();
        let Some(Access::LocalBlob { local_reference, media_type }) = &metadata.access else {
            panic!("metadata should have localBlob access");
        };
        assert_eq!(media_type, YAML_MEDIA_TYPE);
        assert_eq!(local_reference, &blob_digest(b"name: mod\n"));
        assert_eq!(
            std::fs::read(archive.blob_path(local_reference)).unwrap(),
            b"name: mod\n"
        );

        let manifest = descriptor.resource("raw-manifest").unwrap();
        assert!(matches!(
            &manifest.access,
            Some(Access::LocalBlob { media_type, .. }) if media_type == TAR_MEDIA_TYPE
        ));
        assert!(descriptor.component.resources.iter().all(|r| r.input.is_none()));

        assert_eq!(archive.read_descriptor().unwrap(), descriptor);
    }

    #[test]
    fn test_existing_archive_requires_overwrite() {
        let temp = TempDir::new().unwrap();
        let descriptor = descriptor_with_inputs(&temp);
        let dir = temp.path().join("archive");

        ComponentArchive::create(&dir, &descriptor, false).unwrap();
        std::fs::write(dir.join(BLOBS_DIR).join("stale"), "x").unwrap();

        let err = ComponentArchive::create(&dir, &descriptor, false).unwrap_err();
        assert!(matches!(err, ModulectlError::ArchiveExists { .. }));

        ComponentArchive::create(&dir, &descriptor, true).unwrap();
        assert!(!dir.join(BLOBS_DIR).join("stale").exists());
    }
}
