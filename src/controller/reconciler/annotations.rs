//! # Annotations
//!
//! Interpretation of the provisioning annotations on a namespace.

use super::types::{NamespaceEvent, SourceKind};
use crate::constants::ANNOTATION_NAME_SEPARATOR;

/// Sources named by one annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationSpec {
    ConfigMapSource(Vec<String>),
    SecretSource(Vec<String>),
}

impl AnnotationSpec {
    /// Parse an annotation value for the given source kind
    ///
    /// Names are split on `,` and kept verbatim: order is preserved and
    /// duplicates are not removed.
    #[must_use]
    pub fn parse(kind: SourceKind, value: &str) -> Self {
        let names = value
            .split(ANNOTATION_NAME_SEPARATOR)
            .map(str::to_string)
            .collect();
        match kind {
            SourceKind::ConfigMap => Self::ConfigMapSource(names),
            SourceKind::Secret => Self::SecretSource(names),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::ConfigMapSource(_) => SourceKind::ConfigMap,
            Self::SecretSource(_) => SourceKind::Secret,
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        match self {
            Self::ConfigMapSource(names) | Self::SecretSource(names) => names,
        }
    }
}

/// Recognized annotations present on the namespace, config maps first
#[must_use]
pub fn annotation_specs(event: &NamespaceEvent) -> Vec<AnnotationSpec> {
    SourceKind::ORDERED
        .iter()
        .filter_map(|kind| {
            event
                .annotations
                .get(kind.annotation())
                .map(|value| AnnotationSpec::parse(*kind, value))
        })
        .collect()
}
