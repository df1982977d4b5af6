//! # Kind Registry
//!
//! The finite set of resource kinds that templates may contain.
//!
//! Each registered kind maps its `apiVersion`/`kind` type tag to a typed
//! `k8s_openapi` body. Decoding dispatches on the tag; anything not
//! registered is rejected. The registry is an explicit value built once at
//! startup and handed to the decoder and the cluster store.
//!
//! Only namespace-scoped kinds can be registered, since every provisioned
//! resource is placed in the annotated namespace.

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::coordination::v1::Lease;
use k8s_openapi::api::core::v1::{
    ConfigMap, Endpoints, LimitRange, PersistentVolumeClaim, Pod, PodTemplate,
    ReplicationController, ResourceQuota, Secret, Service, ServiceAccount,
};
use k8s_openapi::api::discovery::v1::EndpointSlice;
use k8s_openapi::api::networking::v1::{Ingress, NetworkPolicy};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::{NamespaceResourceScope, Resource};
use kube::core::ApiResource;
use serde_json::Value;

/// Decodes a structured document into the typed body of one kind
pub type DecodeFn = fn(Value) -> Result<ResourceBody, serde_json::Error>;

/// One registered kind
#[derive(Debug, Clone)]
pub struct KindEntry {
    pub group: &'static str,
    pub version: &'static str,
    pub api_version: &'static str,
    pub kind: &'static str,
    /// Plural resource name used in API paths
    pub plural: &'static str,
    decode: DecodeFn,
}

impl KindEntry {
    /// Build the entry for a namespaced `k8s_openapi` resource type
    fn of<K>(decode: DecodeFn) -> Self
    where
        K: Resource<Scope = NamespaceResourceScope>,
    {
        Self {
            group: K::GROUP,
            version: K::VERSION,
            api_version: K::API_VERSION,
            kind: K::KIND,
            plural: K::URL_PATH_SEGMENT,
            decode,
        }
    }

    /// Decode a document of this kind into its typed body
    ///
    /// # Errors
    ///
    /// Returns the deserialization error when the document does not match
    /// the typed schema of the kind.
    pub fn decode(&self, value: Value) -> Result<ResourceBody, serde_json::Error> {
        (self.decode)(value)
    }

    /// Dynamic API resource descriptor for this kind
    #[must_use]
    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.to_string(),
            version: self.version.to_string(),
            api_version: self.api_version.to_string(),
            kind: self.kind.to_string(),
            plural: self.plural.to_string(),
        }
    }

    fn matches(&self, api_version: &str, kind: &str) -> bool {
        self.api_version == api_version && self.kind == kind
    }
}

/// Registered kinds, looked up by type tag
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    entries: Vec<KindEntry>,
}

impl KindRegistry {
    /// Registry without any kinds
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a namespaced kind; a later registration of the same tag replaces the earlier one
    pub fn register<K>(&mut self, decode: DecodeFn) -> &mut Self
    where
        K: Resource<Scope = NamespaceResourceScope>,
    {
        self.entries.retain(|e| !e.matches(K::API_VERSION, K::KIND));
        self.entries.push(KindEntry::of::<K>(decode));
        self
    }

    /// Find the entry for a type tag
    #[must_use]
    pub fn lookup(&self, api_version: &str, kind: &str) -> Option<&KindEntry> {
        self.entries.iter().find(|e| e.matches(api_version, kind))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Declares the typed body variants and the built-in registry in one place
macro_rules! registered_kinds {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        /// Typed body of a decoded manifest, one variant per registered kind
        #[derive(Debug, Clone, PartialEq)]
        pub enum ResourceBody {
            $($variant(Box<$ty>),)+
        }

        impl ResourceBody {
            /// Object metadata of the body
            #[must_use]
            pub fn metadata(&self) -> &ObjectMeta {
                match self {
                    $(Self::$variant(obj) => &obj.metadata,)+
                }
            }

            /// Mutable object metadata of the body
            pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
                match self {
                    $(Self::$variant(obj) => &mut obj.metadata,)+
                }
            }

            /// Encode the body back into its structured representation
            ///
            /// # Errors
            ///
            /// Returns an error if the body cannot be serialized.
            pub fn to_value(&self) -> Result<Value, serde_json::Error> {
                match self {
                    $(Self::$variant(obj) => serde_json::to_value(obj.as_ref()),)+
                }
            }
        }

        impl KindRegistry {
            /// Registry with every built-in kind
            #[must_use]
            pub fn builtin() -> Self {
                let mut registry = Self::empty();
                $(
                    registry.register::<$ty>(|value| {
                        serde_json::from_value::<$ty>(value)
                            .map(|obj| ResourceBody::$variant(Box::new(obj)))
                    });
                )+
                registry
            }
        }
    };
}

registered_kinds! {
    ConfigMap => ConfigMap,
    Secret => Secret,
    ServiceAccount => ServiceAccount,
    Service => Service,
    ResourceQuota => ResourceQuota,
    LimitRange => LimitRange,
    PersistentVolumeClaim => PersistentVolumeClaim,
    Pod => Pod,
    PodTemplate => PodTemplate,
    ReplicationController => ReplicationController,
    Endpoints => Endpoints,
    Deployment => Deployment,
    StatefulSet => StatefulSet,
    DaemonSet => DaemonSet,
    ReplicaSet => ReplicaSet,
    Job => Job,
    CronJob => CronJob,
    HorizontalPodAutoscaler => HorizontalPodAutoscaler,
    EndpointSlice => EndpointSlice,
    Lease => Lease,
    NetworkPolicy => NetworkPolicy,
    Ingress => Ingress,
    Role => Role,
    RoleBinding => RoleBinding,
    PodDisruptionBudget => PodDisruptionBudget,
}
