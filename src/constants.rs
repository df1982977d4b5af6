//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! Defaults here can be overridden via environment variables or CLI flags
//! where applicable (see [`crate::config::ControllerConfig`]).

/// Namespace annotation listing config maps whose entries are provisioned
pub const CONFIG_MAP_ANNOTATION: &str = "namespace-provisioner.daimler-tss.com/config";

/// Namespace annotation listing secrets whose entries are provisioned
pub const SECRET_ANNOTATION: &str = "namespace-provisioner.daimler-tss.com/secret";

/// Separator between annotation names
pub const ANNOTATION_NAME_SEPARATOR: char = ',';

/// Separator between manifest documents inside one entry
pub const DOCUMENT_SEPARATOR: &str = "---";

/// Namespace phase that allows provisioning
pub const NAMESPACE_PHASE_ACTIVE: &str = "Active";

/// Namespace phase of a namespace being deleted
pub const NAMESPACE_PHASE_TERMINATING: &str = "Terminating";

/// Default namespace holding the template config maps and secrets
pub const DEFAULT_CONFIG_NAMESPACE: &str = "default";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Default bind address of the metrics and health server
pub const DEFAULT_METRICS_ADDR: &str = ":8080";

/// Default maximum number of namespaces reconciled at the same time
pub const DEFAULT_MAX_CONCURRENT_RECONCILIATIONS: u16 = 10;

/// Default minimum error backoff (seconds)
pub const DEFAULT_BACKOFF_MIN_SECS: u64 = 5;

/// Default maximum error backoff (seconds)
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Name of the Lease used for leader election
pub const LEADER_LEASE_NAME: &str = "namespace-provisioner-leader";

/// Field manager recorded on writes made by the controller
pub const FIELD_MANAGER: &str = "namespace-provisioner";

/// Default tracing target for the crate
pub const LOG_TARGET: &str = "namespace_provisioner";
