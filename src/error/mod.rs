//! Error types and handling for modulectl
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Module and security configuration errors
//! - [`descriptor`]: Component descriptor and archive errors
//! - [`fs`]: File system and download errors
//! - [`git`]: Git operation errors
//! - [`image`]: Image reference errors

pub mod config;
pub mod descriptor;
pub mod fs;
pub mod git;
mod image;

pub use image::ImageError;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for modulectl operations
#[derive(Error, Diagnostic, Debug)]
pub enum ModulectlError {
    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(modulectl::config::not_found),
        help("Pass the module config with --config-file or create module-config.yaml")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file {path}: {reason}")]
    #[diagnostic(code(modulectl::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid {field}: {message}")]
    #[diagnostic(code(modulectl::config::invalid))]
    ConfigInvalid { field: String, message: String },

    #[error("Security config file does not exist: {path}")]
    #[diagnostic(
        code(modulectl::config::security_missing),
        help("Security scan metadata is skipped for modules without a security config")
    )]
    SecurityConfigFileDoesNotExist { path: String },

    #[error("Invalid label selector '{selector}': {reason}")]
    #[diagnostic(
        code(modulectl::config::invalid_selector),
        help("Use Kubernetes selector syntax, e.g. operator.kyma-project.io/oci-registry-cred=test")
    )]
    InvalidLabelSelector { selector: String, reason: String },

    // Image errors
    #[error(transparent)]
    #[diagnostic(transparent)]
    Image(#[from] ImageError),

    #[error("Failed to parse manifest {path}: {reason}")]
    #[diagnostic(code(modulectl::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    // Git errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(modulectl::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("Failed to clone repository {url}: {reason}")]
    #[diagnostic(
        code(modulectl::git::clone_failed),
        help("Check that the URL is correct and you have access to the repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to resolve git ref '{git_ref}': {reason}")]
    #[diagnostic(code(modulectl::git::ref_resolve_failed))]
    GitRefResolveFailed { git_ref: String, reason: String },

    // Descriptor errors
    #[error("Component descriptor is invalid: {message}")]
    #[diagnostic(code(modulectl::descriptor::invalid))]
    DescriptorInvalid { message: String },

    #[error("Component archive already exists: {path}")]
    #[diagnostic(
        code(modulectl::descriptor::archive_exists),
        help("Pass --overwrite to replace the existing archive")
    )]
    ArchiveExists { path: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(modulectl::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file {path}: {reason}")]
    #[diagnostic(code(modulectl::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file {path}: {reason}")]
    #[diagnostic(code(modulectl::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("Failed to download {url}: {reason}")]
    #[diagnostic(code(modulectl::fs::download_failed))]
    DownloadFailed { url: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(modulectl::fs::io_error))]
    IoError { message: String },

    /// Wraps an error with the operation that was being attempted
    #[error("{operation}: {source}")]
    #[diagnostic(code(modulectl::context))]
    Context {
        operation: String,
        source: Box<ModulectlError>,
    },
}

impl ModulectlError {
    /// Strip all [`ModulectlError::Context`] layers and return the original error
    pub fn root(&self) -> &ModulectlError {
        let mut current = self;
        while let ModulectlError::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Wrap this error with the operation that was being attempted
    #[must_use]
    pub fn wrap(self, operation: impl Into<String>) -> Self {
        ModulectlError::Context {
            operation: operation.into(),
            source: Box::new(self),
        }
    }
}

/// Adds operation context to fallible results
pub trait ResultExt<T> {
    /// Wrap the error, if any, with the operation that was being attempted
    fn context(self, operation: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ModulectlError>,
{
    fn context(self, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().wrap(operation))
    }
}

impl From<std::io::Error> for ModulectlError {
    fn from(err: std::io::Error) -> Self {
        ModulectlError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ModulectlError {
    fn from(err: serde_yaml::Error) -> Self {
        ModulectlError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ModulectlError {
    fn from(err: serde_json::Error) -> Self {
        ModulectlError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for ModulectlError {
    fn from(err: git2::Error) -> Self {
        ModulectlError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, ModulectlError>;
