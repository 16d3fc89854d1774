//! Local blob inputs for descriptor resources
//!
//! A resource either carries rendered text or a single file packed into a
//! tar archive. [`SingleFileArchive`] only ever holds one entry: the file's
//! base name, relative to its parent directory, no matter how deeply the
//! original path was nested.

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tar::{Builder, Header};

use crate::error::{Result, fs};

/// Media type of tar blobs
pub const TAR_MEDIA_TYPE: &str = "application/x-tar";

/// Media type of rendered YAML blobs
pub const YAML_MEDIA_TYPE: &str = "application/x-yaml";

const ENTRY_MODE: u32 = 0o644;

/// Content to store as a local blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceInput {
    /// Rendered text stored as-is
    PlainText { content: String, media_type: String },
    /// One file packed as a tar archive
    Archive(SingleFileArchive),
}

impl ResourceInput {
    /// Text input stored with the YAML media type
    pub fn yaml(content: impl Into<String>) -> Self {
        ResourceInput::PlainText {
            content: content.into(),
            media_type: YAML_MEDIA_TYPE.to_string(),
        }
    }

    pub fn media_type(&self) -> &str {
        match self {
            ResourceInput::PlainText { media_type, .. } => media_type,
            ResourceInput::Archive(_) => TAR_MEDIA_TYPE,
        }
    }

    /// Encode the blob bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            ResourceInput::PlainText { content, .. } => Ok(content.as_bytes().to_vec()),
            ResourceInput::Archive(archive) => archive.to_tar(),
        }
    }
}

/// A tar archive containing exactly one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleFileArchive {
    root: PathBuf,
    entry: OsString,
}

impl SingleFileArchive {
    /// Describe an archive holding only `path`.
    ///
    /// Relative paths are resolved to absolute ones; the parent directory
    /// becomes the archive root and the base name the single entry.
    pub fn for_file(path: &Path) -> Result<Self> {
        let absolute = dunce::canonicalize(path)
            .map_err(|_| fs::not_found(path.display().to_string()))?;
        if !absolute.is_file() {
            return Err(fs::read_failed(
                absolute.display().to_string(),
                "not a regular file",
            ));
        }

        let (Some(root), Some(entry)) = (absolute.parent(), absolute.file_name()) else {
            return Err(fs::read_failed(
                absolute.display().to_string(),
                "path has no parent directory or file name",
            ));
        };

        Ok(Self {
            root: root.to_path_buf(),
            entry: entry.to_os_string(),
        })
    }

    /// Directory the entry is taken from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the single entry inside the archive
    pub fn entry_name(&self) -> &OsStr {
        &self.entry
    }

    /// Build the tar bytes.
    ///
    /// Header fields that vary between machines (mtime, owner) are zeroed so
    /// identical file content always yields an identical blob.
    pub fn to_tar(&self) -> Result<Vec<u8>> {
        let path = self.root.join(&self.entry);
        let mut content = Vec::new();
        File::open(&path)
            .and_then(|mut file| file.read_to_end(&mut content))
            .map_err(|e| fs::read_failed(path.display().to_string(), e.to_string()))?;

        let mut header = Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(ENTRY_MODE);
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        header.set_cksum();

        let mut builder = Builder::new(Vec::new());
        builder
            .append_data(&mut header, Path::new(&self.entry), content.as_slice())
            .map_err(|e| fs::write_failed(path.display().to_string(), e.to_string()))?;
        builder
            .into_inner()
            .map_err(|e| fs::write_failed(path.display().to_string(), e.to_string()))
    }
}
