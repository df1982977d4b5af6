//! # Reconciler
//!
//! Namespace provisioning logic.
//!
//! The reconciler:
//! - Watches namespaces across the cluster
//! - Reads the provisioning annotations of active namespaces
//! - Resolves the named config maps and secrets in the configuration namespace
//! - Decodes their entries into Kubernetes resources
//! - Creates every resource that does not exist yet in the namespace
//!
//! ## Annotations
//!
//! - `namespace-provisioner.daimler-tss.com/config`: comma-separated config map names
//! - `namespace-provisioner.daimler-tss.com/secret`: comma-separated secret names
//!
//! Config maps are processed before secrets. Existing resources are never updated.

pub mod annotations;
pub mod apply;
pub mod engine;
pub mod error;
pub mod sources;
pub mod types;

// Re-export public API
pub use annotations::{annotation_specs, AnnotationSpec};
pub use apply::{inject_namespace, IdempotentCreator};
pub use engine::{reconcile, Reconciler};
pub use error::ReconcilerError;
pub use sources::SourceResolver;
pub use types::{
    ConfigBlob, CreationOutcome, NamespaceEvent, NamespacePhase, ReconcileSummary, SourceKind,
};
