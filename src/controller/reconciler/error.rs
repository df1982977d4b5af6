//! # Reconciler Errors
//!
//! Every failure aborts the reconcile and is handed back to the controller
//! runtime, which decides when to retry. A namespace that no longer exists
//! is not an error and has no variant here.

use super::types::SourceKind;
use crate::controller::manifest::{DocumentError, ResourceKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("failed to get namespace {namespace}: {source:#}")]
    NamespaceFetch {
        namespace: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{kind} {config_namespace}/{name} not found")]
    SourceNotFound {
        kind: SourceKind,
        name: String,
        config_namespace: String,
    },

    #[error("failed to get {kind} {config_namespace}/{name}: {source:#}")]
    SourceFetch {
        kind: SourceKind,
        name: String,
        config_namespace: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("entry {key} of {kind} {name} is not valid UTF-8")]
    SourceEntryEncoding {
        kind: SourceKind,
        name: String,
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("failed to decode {origin}, {source}")]
    Decode {
        origin: String,
        #[source]
        source: DocumentError,
    },

    #[error("failed to look up {key}: {source:#}")]
    Lookup {
        key: ResourceKey,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to create {key}: {source:#}")]
    Create {
        key: ResourceKey,
        #[source]
        source: anyhow::Error,
    },
}

impl ReconcilerError {
    /// Short, stable label for metrics and log fields
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NamespaceFetch { .. } => "namespace-fetch",
            Self::SourceNotFound { .. } | Self::SourceFetch { .. } => "source-fetch",
            Self::SourceEntryEncoding { .. } => "source-encoding",
            Self::Decode { .. } => "decode",
            Self::Lookup { .. } => "lookup",
            Self::Create { .. } => "create",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::manifest::DecodeError;

    #[test]
    fn test_source_not_found_message() {
        let err = ReconcilerError::SourceNotFound {
            kind: SourceKind::ConfigMap,
            name: "not-existing-config-map".to_string(),
            config_namespace: "config-namespace".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ConfigMap config-namespace/not-existing-config-map not found"
        );
        assert_eq!(err.reason(), "source-fetch");
    }

    #[test]
    fn test_decode_message_names_document() {
        let err = ReconcilerError::Decode {
            origin: "ConfigMap templates key policy".to_string(),
            source: DocumentError {
                index: 2,
                source: DecodeError::EmptyDocument,
            },
        };
        assert_eq!(
            err.to_string(),
            "failed to decode ConfigMap templates key policy, document 2: document is empty"
        );
        assert_eq!(err.reason(), "decode");
    }

    #[test]
    fn test_create_message_includes_cause_chain() {
        let err = ReconcilerError::Create {
            key: ResourceKey {
                kind: "Ingress".to_string(),
                api_version: "networking.k8s.io/v1".to_string(),
                name: "test-ingress".to_string(),
                namespace: "my-namespace".to_string(),
            },
            source: anyhow::anyhow!("quota exceeded").context("Failed to create"),
        };
        let message = err.to_string();
        assert!(message.contains("my-namespace/test-ingress"), "{message}");
        assert!(message.contains("quota exceeded"), "{message}");
    }
}
