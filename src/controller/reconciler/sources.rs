//! # Configuration Sources
//!
//! Resolves the names listed in the provisioning annotations into raw
//! configuration blobs.
//!
//! Sources are fetched from the configuration namespace one name at a time.
//! Every entry of a resolved object becomes one blob; entries are taken in
//! key order. Secret entries arrive as bytes and are converted to text. A
//! single missing or unreadable source fails the whole resolution.

use super::annotations::AnnotationSpec;
use super::error::ReconcilerError;
use super::types::{ConfigBlob, SourceKind};
use crate::cluster::ClusterStore;
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Fetches named config maps and secrets from the configuration namespace
pub struct SourceResolver<'a> {
    store: &'a dyn ClusterStore,
    config_namespace: &'a str,
}

impl std::fmt::Debug for SourceResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceResolver")
            .field("config_namespace", &self.config_namespace)
            .finish_non_exhaustive()
    }
}

impl<'a> SourceResolver<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ClusterStore, config_namespace: &'a str) -> Self {
        Self {
            store,
            config_namespace,
        }
    }

    /// Resolve every name of one kind, in the order given
    ///
    /// # Errors
    ///
    /// Returns the error of the first name that cannot be resolved; blobs
    /// gathered for earlier names are discarded.
    pub async fn resolve(
        &self,
        kind: SourceKind,
        names: &[String],
    ) -> Result<Vec<ConfigBlob>, ReconcilerError> {
        let mut blobs = Vec::new();
        for name in names {
            let entries = self.fetch_entries(kind, name).await.inspect_err(|e| {
                error!(
                    source.kind = %kind,
                    source.name = %name,
                    config_namespace = %self.config_namespace,
                    "Error getting {} {} in namespace {}: {}",
                    kind, name, self.config_namespace, e
                );
            })?;
            debug!(
                "Found {} {} in namespace {}",
                kind, name, self.config_namespace
            );

            for (key, content) in entries {
                debug!(
                    "Add {} from {} {} in namespace {}",
                    key, kind, name, self.config_namespace
                );
                blobs.push(ConfigBlob {
                    source_kind: kind,
                    source_name: name.clone(),
                    key,
                    content,
                });
            }
        }
        Ok(blobs)
    }

    /// Resolve the annotations in order, concatenating their blobs
    ///
    /// # Errors
    ///
    /// Returns the first resolution error.
    pub async fn aggregate(
        &self,
        specs: &[AnnotationSpec],
    ) -> Result<Vec<ConfigBlob>, ReconcilerError> {
        let mut blobs = Vec::new();
        for spec in specs {
            blobs.extend(self.resolve(spec.kind(), spec.names()).await?);
        }
        Ok(blobs)
    }

    async fn fetch_entries(
        &self,
        kind: SourceKind,
        name: &str,
    ) -> Result<Vec<(String, String)>, ReconcilerError> {
        match kind {
            SourceKind::ConfigMap => {
                let config_map = self
                    .store
                    .get_config_map(self.config_namespace, name)
                    .await
                    .map_err(|source| self.fetch_error(kind, name, source))?
                    .ok_or_else(|| self.not_found(kind, name))?;
                Ok(config_map.data.unwrap_or_default().into_iter().collect())
            }
            SourceKind::Secret => {
                let secret = self
                    .store
                    .get_secret(self.config_namespace, name)
                    .await
                    .map_err(|source| self.fetch_error(kind, name, source))?
                    .ok_or_else(|| self.not_found(kind, name))?;
                secret_entries(name, secret.data.unwrap_or_default())
            }
        }
    }

    fn fetch_error(&self, kind: SourceKind, name: &str, source: anyhow::Error) -> ReconcilerError {
        ReconcilerError::SourceFetch {
            kind,
            name: name.to_string(),
            config_namespace: self.config_namespace.to_string(),
            source,
        }
    }

    fn not_found(&self, kind: SourceKind, name: &str) -> ReconcilerError {
        ReconcilerError::SourceNotFound {
            kind,
            name: name.to_string(),
            config_namespace: self.config_namespace.to_string(),
        }
    }
}

fn secret_entries(
    name: &str,
    data: BTreeMap<String, k8s_openapi::ByteString>,
) -> Result<Vec<(String, String)>, ReconcilerError> {
    data.into_iter()
        .map(|(key, bytes)| match String::from_utf8(bytes.0) {
            Ok(text) => Ok((key, text)),
            Err(source) => Err(ReconcilerError::SourceEntryEncoding {
                kind: SourceKind::Secret,
                name: name.to_string(),
                key,
                source,
            }),
        })
        .collect()
}
