//! # Reconciler Types
//!
//! Per-reconcile values. All of them are built fresh for one reconcile and
//! dropped at its end.

use crate::constants::{
    CONFIG_MAP_ANNOTATION, NAMESPACE_PHASE_ACTIVE, NAMESPACE_PHASE_TERMINATING, SECRET_ANNOTATION,
};
use k8s_openapi::api::core::v1::Namespace;
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle phase of a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespacePhase {
    Active,
    Terminating,
    /// Any other phase, or no phase reported yet
    Other(Option<String>),
}

impl NamespacePhase {
    #[must_use]
    pub fn parse(phase: Option<&str>) -> Self {
        match phase {
            Some(NAMESPACE_PHASE_ACTIVE) => Self::Active,
            Some(NAMESPACE_PHASE_TERMINATING) => Self::Terminating,
            other => Self::Other(other.map(str::to_string)),
        }
    }
}

impl fmt::Display for NamespacePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str(NAMESPACE_PHASE_ACTIVE),
            Self::Terminating => f.write_str(NAMESPACE_PHASE_TERMINATING),
            Self::Other(Some(phase)) => f.write_str(phase),
            Self::Other(None) => f.write_str("<none>"),
        }
    }
}

/// Snapshot of the namespace a reconcile runs for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEvent {
    pub name: String,
    pub phase: NamespacePhase,
    pub annotations: BTreeMap<String, String>,
}

impl NamespaceEvent {
    /// Build the snapshot from a fetched namespace
    ///
    /// `fallback_name` is used when the object carries no name.
    #[must_use]
    pub fn from_namespace(namespace: &Namespace, fallback_name: &str) -> Self {
        Self {
            name: namespace
                .metadata
                .name
                .clone()
                .unwrap_or_else(|| fallback_name.to_string()),
            phase: NamespacePhase::parse(
                namespace
                    .status
                    .as_ref()
                    .and_then(|status| status.phase.as_deref()),
            ),
            annotations: namespace.metadata.annotations.clone().unwrap_or_default(),
        }
    }
}

/// Kind of object a configuration source names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    ConfigMap,
    Secret,
}

impl SourceKind {
    /// Recognized kinds, in the order their annotations are processed
    pub const ORDERED: [SourceKind; 2] = [SourceKind::ConfigMap, SourceKind::Secret];

    /// Namespace annotation naming sources of this kind
    #[must_use]
    pub fn annotation(self) -> &'static str {
        match self {
            Self::ConfigMap => CONFIG_MAP_ANNOTATION,
            Self::Secret => SECRET_ANNOTATION,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigMap => f.write_str("ConfigMap"),
            Self::Secret => f.write_str("Secret"),
        }
    }
}

/// Raw content of one entry of a resolved source object
#[derive(Clone, PartialEq, Eq)]
pub struct ConfigBlob {
    pub source_kind: SourceKind,
    pub source_name: String,
    pub key: String,
    pub content: String,
}

// Content stays out of Debug output since it may come from a secret.
impl fmt::Debug for ConfigBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBlob")
            .field("source_kind", &self.source_kind)
            .field("source_name", &self.source_name)
            .field("key", &self.key)
            .field("content_len", &self.content.len())
            .finish()
    }
}

impl fmt::Display for ConfigBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} key {}", self.source_kind, self.source_name, self.key)
    }
}

/// Result of applying one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationOutcome {
    Created,
    AlreadyExists,
}

/// What a reconcile pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileSummary {
    /// The namespace no longer exists
    NamespaceGone,
    /// The namespace is not active
    NotActive { phase: NamespacePhase },
    /// No recognized annotation on the namespace
    NotAnnotated,
    /// The pipeline ran to completion
    Provisioned { created: usize, existing: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::NamespaceStatus;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_phase_parse() {
        assert_eq!(NamespacePhase::parse(Some("Active")), NamespacePhase::Active);
        assert_eq!(
            NamespacePhase::parse(Some("Terminating")),
            NamespacePhase::Terminating
        );
        assert_eq!(
            NamespacePhase::parse(Some("Pending")),
            NamespacePhase::Other(Some("Pending".to_string()))
        );
        assert_eq!(NamespacePhase::parse(None), NamespacePhase::Other(None));
    }

    #[test]
    fn test_namespace_event_from_namespace() {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some("my-namespace".to_string()),
                annotations: Some(BTreeMap::from([(
                    CONFIG_MAP_ANNOTATION.to_string(),
                    "a,b".to_string(),
                )])),
                ..Default::default()
            },
            status: Some(NamespaceStatus {
                phase: Some("Active".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let event = NamespaceEvent::from_namespace(&namespace, "ignored");
        assert_eq!(event.name, "my-namespace");
        assert_eq!(event.phase, NamespacePhase::Active);
        assert_eq!(event.annotations.get(CONFIG_MAP_ANNOTATION).unwrap(), "a,b");
    }

    #[test]
    fn test_namespace_without_status_is_other_phase() {
        let event = NamespaceEvent::from_namespace(&Namespace::default(), "fallback");
        assert_eq!(event.name, "fallback");
        assert_eq!(event.phase, NamespacePhase::Other(None));
        assert!(event.annotations.is_empty());
    }

    #[test]
    fn test_config_blob_debug_hides_content() {
        let blob = ConfigBlob {
            source_kind: SourceKind::Secret,
            source_name: "templates".to_string(),
            key: "policy".to_string(),
            content: "super-secret".to_string(),
        };
        let rendered = format!("{blob:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("content_len"));
    }

    #[test]
    fn test_source_kind_order_is_config_map_first() {
        assert_eq!(SourceKind::ORDERED, [SourceKind::ConfigMap, SourceKind::Secret]);
        assert_eq!(SourceKind::Secret.annotation(), SECRET_ANNOTATION);
    }
}
