//! Descriptor labels
//!
//! Label values are polymorphic. Each variant serializes as its natural YAML
//! shape so descriptors stay readable and round-trip without loss.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Version used for every label modulectl creates
pub const LABEL_VERSION: &str = "v1";

/// A named, versioned label on a descriptor element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: LabelValue,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

/// Label value: plain string, flat map, or list of flat maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    Text(String),
    Map(BTreeMap<String, String>),
    List(Vec<BTreeMap<String, String>>),
}

impl Label {
    /// Create a string-valued label at [`LABEL_VERSION`]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: LabelValue::Text(value.into()),
            version: LABEL_VERSION.to_string(),
        }
    }

    /// Create a map-valued label at [`LABEL_VERSION`]
    pub fn map(name: impl Into<String>, value: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            value: LabelValue::Map(value),
            version: LABEL_VERSION.to_string(),
        }
    }

    /// The value as a string, if it is one
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            LabelValue::Text(text) => Some(text),
            _ => None,
        }
    }
}
