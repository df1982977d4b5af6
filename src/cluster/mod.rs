//! # Cluster Store
//!
//! Seam between the reconciliation pipeline and the Kubernetes API.
//!
//! The pipeline only needs a handful of reads and one write. Not-found is
//! not an error at this level: reads return `Ok(None)` and the existence
//! check returns `Ok(false)`, so callers can tell absence apart from
//! failures such as permission errors.

use crate::controller::manifest::{DecodedResource, ResourceKey};
use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret};

pub mod kube_store;

pub use kube_store::KubeStore;

/// Read and create access to cluster resources
#[async_trait]
pub trait ClusterStore: Send + Sync {
    /// Get a namespace by name
    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>>;

    /// Get a config map
    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>>;

    /// Get a secret
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>>;

    /// Whether a resource with this identity exists
    async fn resource_exists(&self, key: &ResourceKey) -> Result<bool>;

    /// Create a resource in the namespace recorded on it
    async fn create_resource(&self, resource: &DecodedResource) -> Result<()>;
}
