//! Configuration file handling for modulectl
//!
//! This module contains data structures for:
//! - `module-config.yaml` - Module configuration
//! - `sec-scanners-config.yaml` - Security scanners configuration

pub mod module;
pub mod security;
pub mod validation;

// Re-export commonly used types
pub use module::{DEFAULT_NAMESPACE, Manager, ModuleConfig};
pub use security::{MendConfig, SecurityScanConfig};
pub use validation::{
    validate_channel, validate_manager, validate_module_config, validate_name, validate_namespace,
    validate_resource_name, validate_version,
};
