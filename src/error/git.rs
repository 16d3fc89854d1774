//! Git operation errors

use super::ModulectlError;

/// Creates a clone failed error
pub fn clone_failed(url: impl Into<String>, reason: impl Into<String>) -> ModulectlError {
    ModulectlError::GitCloneFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a ref resolution error
pub fn ref_resolve_failed(git_ref: impl Into<String>, reason: impl Into<String>) -> ModulectlError {
    ModulectlError::GitRefResolveFailed {
        git_ref: git_ref.into(),
        reason: reason.into(),
    }
}
