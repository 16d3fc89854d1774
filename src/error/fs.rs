//! File system errors

use super::ModulectlError;

/// Creates a file not found error
pub fn not_found(path: impl Into<String>) -> ModulectlError {
    ModulectlError::FileNotFound { path: path.into() }
}

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> ModulectlError {
    ModulectlError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> ModulectlError {
    ModulectlError::FileWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a download failed error
pub fn download_failed(url: impl Into<String>, reason: impl Into<String>) -> ModulectlError {
    ModulectlError::DownloadFailed {
        url: url.into(),
        reason: reason.into(),
    }
}
