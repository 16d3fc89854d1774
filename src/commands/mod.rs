//! Command implementations for modulectl CLI

pub mod completions;
pub mod create;
pub mod version;
