//! # Decoded Resources
//!
//! A manifest document after decoding, with its identity exposed as plain
//! fields so downstream stages never need to look inside the typed body.

use super::registry::ResourceBody;
use serde_json::Value;
use std::fmt;

/// Identity used to decide whether a resource already exists
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub kind: String,
    pub api_version: String,
    pub name: String,
    pub namespace: String,
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}/{}",
            self.api_version, self.kind, self.namespace, self.name
        )
    }
}

/// A manifest document decoded into one of the registered kinds
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResource {
    pub kind: String,
    pub api_version: String,
    pub name: String,
    /// Namespace the template asked for; replaced before creation
    pub namespace: String,
    pub body: ResourceBody,
}

impl DecodedResource {
    #[must_use]
    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            kind: self.kind.clone(),
            api_version: self.api_version.clone(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }

    /// Encode the full object for a create call
    ///
    /// The plain `name` and `namespace` fields are authoritative and are
    /// written into the object metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the typed body cannot be serialized.
    pub fn encode(&self) -> Result<Value, serde_json::Error> {
        let mut body = self.body.clone();
        let metadata = body.metadata_mut();
        metadata.name = Some(self.name.clone());
        metadata.namespace = if self.namespace.is_empty() {
            None
        } else {
            Some(self.namespace.clone())
        };
        body.to_value()
    }
}
