//! Configuration errors

use super::ModulectlError;

/// Creates a config not found error
pub fn not_found(path: impl Into<String>) -> ModulectlError {
    ModulectlError::ConfigNotFound { path: path.into() }
}

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> ModulectlError {
    ModulectlError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config field error
pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> ModulectlError {
    ModulectlError::ConfigInvalid {
        field: field.into(),
        message: message.into(),
    }
}

/// Creates a missing security config error
pub fn security_missing(path: impl Into<String>) -> ModulectlError {
    ModulectlError::SecurityConfigFileDoesNotExist { path: path.into() }
}

/// Creates an invalid label selector error
pub fn invalid_selector(selector: impl Into<String>, reason: impl Into<String>) -> ModulectlError {
    ModulectlError::InvalidLabelSelector {
        selector: selector.into(),
        reason: reason.into(),
    }
}
