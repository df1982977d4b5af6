//! Common test utilities for reconcile tests
//!
//! Provides an in-memory [`ClusterStore`] with failure injection and
//! builders for namespaces, config maps and secrets.

#![allow(dead_code, reason = "each test binary uses a subset of the helpers")]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, NamespaceStatus, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use namespace_provisioner::cluster::ClusterStore;
use namespace_provisioner::config::ControllerConfig;
use namespace_provisioner::controller::manifest::{DecodedResource, KindRegistry, ResourceKey};
use namespace_provisioner::controller::reconciler::Reconciler;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const CONFIG_NAMESPACE: &str = "config-namespace";

#[derive(Default)]
struct State {
    namespaces: HashMap<String, Namespace>,
    config_maps: HashMap<(String, String), ConfigMap>,
    secrets: HashMap<(String, String), Secret>,
    resources: HashMap<ResourceKey, Value>,
    created: Vec<ResourceKey>,
    lookups: usize,
    fail_namespace_fetch: bool,
    fail_lookups: bool,
    fail_create_names: HashSet<String>,
}

/// Cluster state kept in memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_namespace(&self, namespace: Namespace) {
        let name = namespace.metadata.name.clone().unwrap();
        self.state.lock().unwrap().namespaces.insert(name, namespace);
    }

    pub fn add_config_map(&self, config_map: ConfigMap) {
        let key = (
            config_map.metadata.namespace.clone().unwrap(),
            config_map.metadata.name.clone().unwrap(),
        );
        self.state.lock().unwrap().config_maps.insert(key, config_map);
    }

    pub fn add_secret(&self, secret: Secret) {
        let key = (
            secret.metadata.namespace.clone().unwrap(),
            secret.metadata.name.clone().unwrap(),
        );
        self.state.lock().unwrap().secrets.insert(key, secret);
    }

    /// Seed a resource as if someone had created it earlier
    pub fn add_existing(&self, key: ResourceKey, body: Value) {
        self.state.lock().unwrap().resources.insert(key, body);
    }

    pub fn fail_namespace_fetch(&self) {
        self.state.lock().unwrap().fail_namespace_fetch = true;
    }

    pub fn fail_lookups(&self) {
        self.state.lock().unwrap().fail_lookups = true;
    }

    /// Reject creation of any resource with this name
    pub fn fail_create(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_create_names
            .insert(name.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_namespace_fetch = false;
        state.fail_lookups = false;
        state.fail_create_names.clear();
    }

    /// Keys of resources created through the store, in creation order
    pub fn created(&self) -> Vec<ResourceKey> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created().into_iter().map(|key| key.name).collect()
    }

    pub fn resource(&self, key: &ResourceKey) -> Option<Value> {
        self.state.lock().unwrap().resources.get(key).cloned()
    }

    pub fn lookups(&self) -> usize {
        self.state.lock().unwrap().lookups
    }
}

#[async_trait]
impl ClusterStore for MemoryStore {
    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>> {
        let state = self.state.lock().unwrap();
        if state.fail_namespace_fetch {
            return Err(anyhow!("connection refused"));
        }
        Ok(state.namespaces.get(name).cloned())
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn resource_exists(&self, key: &ResourceKey) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.lookups += 1;
        if state.fail_lookups {
            return Err(anyhow!("forbidden"));
        }
        Ok(state.resources.contains_key(key))
    }

    async fn create_resource(&self, resource: &DecodedResource) -> Result<()> {
        let key = resource.key();
        let body = resource.encode()?;
        let mut state = self.state.lock().unwrap();
        if state.fail_create_names.contains(&key.name) {
            return Err(anyhow!("admission webhook denied the request"));
        }
        if state.resources.contains_key(&key) {
            return Err(anyhow!("{key} already exists"));
        }
        state.resources.insert(key.clone(), body);
        state.created.push(key);
        Ok(())
    }
}

pub fn namespace(name: &str, phase: Option<&str>, annotations: &[(&str, &str)]) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            annotations: if annotations.is_empty() {
                None
            } else {
                Some(
                    annotations
                        .iter()
                        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                        .collect(),
                )
            },
            ..ObjectMeta::default()
        },
        status: Some(NamespaceStatus {
            phase: phase.map(str::to_string),
            ..NamespaceStatus::default()
        }),
        ..Namespace::default()
    }
}

pub fn config_map(name: &str, data: &[(&str, &str)]) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(CONFIG_NAMESPACE.to_string()),
            ..ObjectMeta::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<BTreeMap<_, _>>(),
        ),
        ..ConfigMap::default()
    }
}

pub fn secret(name: &str, data: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(CONFIG_NAMESPACE.to_string()),
            ..ObjectMeta::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| ((*k).to_string(), ByteString(v.as_bytes().to_vec())))
                .collect::<BTreeMap<_, _>>(),
        ),
        ..Secret::default()
    }
}

pub fn key(api_version: &str, kind: &str, namespace: &str, name: &str) -> ResourceKey {
    ResourceKey {
        kind: kind.to_string(),
        api_version: api_version.to_string(),
        name: name.to_string(),
        namespace: namespace.to_string(),
    }
}

/// Reconciler over the given store with the built-in kinds
pub fn reconciler(store: Arc<MemoryStore>) -> Reconciler {
    let config = ControllerConfig {
        config_namespace: CONFIG_NAMESPACE.to_string(),
        ..ControllerConfig::default()
    };
    Reconciler::new(store, Arc::new(KindRegistry::builtin()), &config)
}
