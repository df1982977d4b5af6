//! # Apply
//!
//! Namespace injection and existence-gated creation.
//!
//! A resource is created only when nothing with the same identity exists
//! in the target namespace. Existing resources are left untouched, even if
//! their content differs from the template.

use super::error::ReconcilerError;
use super::types::CreationOutcome;
use crate::cluster::ClusterStore;
use crate::controller::manifest::DecodedResource;
use tracing::{debug, info};

/// Place a resource in the target namespace, whatever the template said
pub fn inject_namespace(resource: &mut DecodedResource, target_namespace: &str) {
    if !resource.namespace.is_empty() && resource.namespace != target_namespace {
        debug!(
            resource = %resource.name,
            template_namespace = %resource.namespace,
            target_namespace = %target_namespace,
            "Overriding template namespace"
        );
    }
    resource.namespace = target_namespace.to_string();
}

/// Creates resources that do not exist yet; never updates
pub struct IdempotentCreator<'a> {
    store: &'a dyn ClusterStore,
}

impl std::fmt::Debug for IdempotentCreator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdempotentCreator").finish_non_exhaustive()
    }
}

impl<'a> IdempotentCreator<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ClusterStore) -> Self {
        Self { store }
    }

    /// Inject the target namespace and create the resource if it is absent
    ///
    /// # Errors
    ///
    /// Returns [`ReconcilerError::Lookup`] if the existence check fails and
    /// [`ReconcilerError::Create`] if the create call is rejected.
    pub async fn apply(
        &self,
        mut resource: DecodedResource,
        target_namespace: &str,
    ) -> Result<CreationOutcome, ReconcilerError> {
        inject_namespace(&mut resource, target_namespace);
        let key = resource.key();

        let exists = self
            .store
            .resource_exists(&key)
            .await
            .map_err(|source| ReconcilerError::Lookup {
                key: key.clone(),
                source,
            })?;

        if exists {
            debug!("Object {} already exists", key);
            return Ok(CreationOutcome::AlreadyExists);
        }

        info!(
            "Try to create object of kind {} with version {} on namespace {}",
            resource.kind, resource.api_version, resource.namespace
        );
        self.store
            .create_resource(&resource)
            .await
            .map_err(|source| ReconcilerError::Create {
                key: key.clone(),
                source,
            })?;
        info!(resource = %key, "Created object");
        Ok(CreationOutcome::Created)
    }
}
