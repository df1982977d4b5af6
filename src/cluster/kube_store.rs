//! # Kubernetes Store
//!
//! [`ClusterStore`] backed by a `kube::Client`.
//!
//! Typed APIs are used for namespaces, config maps and secrets. Provisioned
//! resources go through `DynamicObject` APIs, resolved from the
//! [`KindRegistry`] so that lookups and creates are generic over every
//! registered kind.

use super::ClusterStore;
use crate::constants::FIELD_MANAGER;
use crate::controller::manifest::{DecodedResource, KindRegistry, ResourceKey};
use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret};
use kube::api::{Api, PostParams};
use kube::core::{ApiResource, DynamicObject};
use kube::Client;
use std::sync::Arc;
use tracing::debug;

/// Cluster access through the Kubernetes API server
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    registry: Arc<KindRegistry>,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore")
            .field("kinds", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client, registry: Arc<KindRegistry>) -> Self {
        Self { client, registry }
    }

    fn api_resource(&self, api_version: &str, kind: &str) -> Result<ApiResource> {
        self.registry
            .lookup(api_version, kind)
            .map(crate::controller::manifest::KindEntry::api_resource)
            .with_context(|| format!("Resource kind {kind} in {api_version} is not registered"))
    }

    fn dynamic_api(&self, namespace: &str, ar: &ApiResource) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, ar)
    }
}

#[async_trait]
impl ClusterStore for KubeStore {
    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.get_opt(name)
            .await
            .with_context(|| format!("Failed to get Namespace {name}"))
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name)
            .await
            .with_context(|| format!("Failed to get ConfigMap {namespace}/{name}"))
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name)
            .await
            .with_context(|| format!("Failed to get Secret {namespace}/{name}"))
    }

    async fn resource_exists(&self, key: &ResourceKey) -> Result<bool> {
        let ar = self.api_resource(&key.api_version, &key.kind)?;
        let api = self.dynamic_api(&key.namespace, &ar);
        let found = api
            .get_opt(&key.name)
            .await
            .with_context(|| format!("Failed to look up {key}"))?;
        debug!(resource = %key, exists = found.is_some(), "Existence check");
        Ok(found.is_some())
    }

    async fn create_resource(&self, resource: &DecodedResource) -> Result<()> {
        let key = resource.key();
        let ar = self.api_resource(&resource.api_version, &resource.kind)?;
        let value = resource
            .encode()
            .with_context(|| format!("Failed to encode {key}"))?;
        let object: DynamicObject = serde_json::from_value(value)
            .with_context(|| format!("Failed to convert {key} into a dynamic object"))?;

        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..PostParams::default()
        };
        self.dynamic_api(&resource.namespace, &ar)
            .create(&params, &object)
            .await
            .with_context(|| format!("Failed to create {key}"))?;
        Ok(())
    }
}
