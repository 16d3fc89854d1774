//! Component descriptor and archive errors

use super::ModulectlError;

/// Creates a schema validation error
pub fn invalid(message: impl Into<String>) -> ModulectlError {
    ModulectlError::DescriptorInvalid {
        message: message.into(),
    }
}

/// Creates an archive exists error
pub fn archive_exists(path: impl Into<String>) -> ModulectlError {
    ModulectlError::ArchiveExists { path: path.into() }
}
