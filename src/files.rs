//! File access for module inputs
//!
//! Module configs reference their manifest, default CR and security config
//! by relative path, absolute path or `http(s)` URL. [`FileResolver`] turns
//! each reference into a local absolute path. Remote files are downloaded
//! into temp files owned by the resolver and deleted when it is dropped, so
//! cleanup happens on every exit path of a packaging run.

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, fs};

/// Read access to local files
pub trait FileReader {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;
    fn file_exists(&self, path: &Path) -> bool;

    /// Read a file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes)
            .map_err(|e| fs::read_failed(path.display().to_string(), e.to_string()))
    }
}

/// [`FileReader`] backed by the real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileReader;

impl FileReader for OsFileReader {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        if !path.exists() {
            return Err(fs::not_found(path.display().to_string()));
        }
        std::fs::read(path).map_err(|e| fs::read_failed(path.display().to_string(), e.to_string()))
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Returns a directory path suitable for creating temporary files.
///
/// Never returns a relative path, so temp files are never created under the
/// current working directory (e.g. when `TMPDIR=tmp`).
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// Whether a file reference points at a remote location
pub fn is_remote(reference: &str) -> bool {
    reference.starts_with("https://") || reference.starts_with("http://")
}

/// Resolves file references relative to a base directory
#[derive(Debug)]
pub struct FileResolver {
    base_dir: PathBuf,
    downloads: Vec<NamedTempFile>,
}

impl FileResolver {
    /// Resolve relative references against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            downloads: Vec::new(),
        }
    }

    /// Turn a reference into an absolute local path.
    ///
    /// Local paths are not required to exist; callers decide whether a
    /// missing file is an error.
    pub fn resolve(&mut self, reference: &str) -> Result<PathBuf> {
        if is_remote(reference) {
            return self.download(reference);
        }

        let path = Path::new(reference);
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        Ok(dunce::canonicalize(&absolute).unwrap_or(absolute))
    }

    /// Number of downloaded temp files currently held
    pub fn download_count(&self) -> usize {
        self.downloads.len()
    }

    fn download(&mut self, url: &str) -> Result<PathBuf> {
        debug!(url, "downloading remote module file");
        let response = reqwest::blocking::get(url)
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| fs::download_failed(url, e.to_string()))?;
        let body = response
            .bytes()
            .map_err(|e| fs::download_failed(url, e.to_string()))?;

        let mut file = tempfile::Builder::new()
            .prefix("modulectl-")
            .suffix(".yaml")
            .tempfile_in(temp_dir_base())
            .map_err(|e| fs::download_failed(url, e.to_string()))?;
        file.write_all(&body)
            .map_err(|e| fs::write_failed(file.path().display().to_string(), e.to_string()))?;

        let path = file.path().to_path_buf();
        self.downloads.push(file);
        Ok(path)
    }
}
