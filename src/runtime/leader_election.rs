//! # Leader Election
//!
//! Lease-based leader election over `coordination.k8s.io/v1`, enabled with
//! `--enable-leader-election`. Only the replica holding the lease watches
//! namespaces.
//!
//! Writes carry the lease's `resourceVersion`, so a concurrent change makes
//! the write fail with 409 Conflict instead of producing two leaders.

use crate::constants::{FIELD_MANAGER, LEADER_LEASE_NAME};
use chrono::{DateTime, Utc};
use k8s_openapi::api::coordination::v1::{Lease, LeaseSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{MicroTime, ObjectMeta};
use kube::api::{Api, PostParams};
use kube::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const LEASE_DURATION: Duration = Duration::from_secs(30);
const RENEW_INTERVAL: Duration = Duration::from_secs(10);
const RETRY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum LeaderElectionError {
    #[error("kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("lease {0} has no resourceVersion")]
    MissingResourceVersion(String),
}

/// Identity of this replica: `POD_NAME`, then `HOSTNAME`, then a random UUID
#[must_use]
pub fn leader_identity() -> String {
    identity_from_lookup(|key| std::env::var(key).ok())
}

/// Identity lookup with an injectable environment
pub fn identity_from_lookup<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["POD_NAME", "HOSTNAME"]
        .iter()
        .find_map(|key| lookup(key).filter(|value| !value.is_empty()))
        .unwrap_or_else(|| format!("namespace-provisioner-{}", uuid::Uuid::new_v4()))
}

/// Whether a lease held by someone else may be taken over
///
/// A lease without renew time or duration counts as expired.
#[must_use]
pub fn lease_expired(spec: Option<&LeaseSpec>, now: DateTime<Utc>) -> bool {
    let renew_time = spec.and_then(|s| s.renew_time.as_ref());
    let duration_secs = spec.and_then(|s| s.lease_duration_seconds);
    match (renew_time, duration_secs) {
        (Some(renewed), Some(duration)) => {
            now > renewed.0 + chrono::Duration::seconds(i64::from(duration))
        }
        _ => true,
    }
}

/// Leader elector using Kubernetes Leases
pub struct LeaderElector {
    client: Client,
    lease_name: String,
    namespace: String,
    identity: String,
}

impl std::fmt::Debug for LeaderElector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaderElector")
            .field("lease_name", &self.lease_name)
            .field("namespace", &self.namespace)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl LeaderElector {
    #[must_use]
    pub fn new(client: Client, namespace: &str, identity: &str) -> Self {
        Self {
            client,
            lease_name: LEADER_LEASE_NAME.to_string(),
            namespace: namespace.to_string(),
            identity: identity.to_string(),
        }
    }

    /// Block until leadership is acquired, then return a guard that keeps renewing
    ///
    /// Transient API errors are logged and retried.
    pub async fn acquire(self: Arc<Self>) -> LeaderGuard {
        info!(
            identity = %self.identity,
            lease = %self.lease_name,
            namespace = %self.namespace,
            "Waiting for leadership..."
        );

        loop {
            match self.try_acquire_or_renew().await {
                Ok(true) => {
                    info!(identity = %self.identity, "Leadership acquired");
                    return self.guard();
                }
                Ok(false) => {
                    debug!(identity = %self.identity, "Lease held by another replica");
                }
                Err(e) => {
                    warn!(identity = %self.identity, error = %e, "Failed to acquire lease, retrying");
                }
            }
            tokio::time::sleep(RETRY_INTERVAL).await;
        }
    }

    fn guard(self: &Arc<Self>) -> LeaderGuard {
        let (lost_tx, lost_rx) = oneshot::channel();
        let elector = Arc::clone(self);
        let renewal_task = tokio::spawn(async move { elector.renewal_loop(lost_tx).await });
        LeaderGuard {
            renewal_task,
            lost_rx: Some(lost_rx),
        }
    }

    async fn renewal_loop(&self, lost_tx: oneshot::Sender<()>) {
        loop {
            tokio::time::sleep(RENEW_INTERVAL).await;
            match self.try_acquire_or_renew().await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(identity = %self.identity, "Leadership lost");
                    let _ = lost_tx.send(());
                    return;
                }
                Err(e) => {
                    warn!(identity = %self.identity, error = %e, "Lease renewal failed, leadership lost");
                    let _ = lost_tx.send(());
                    return;
                }
            }
        }
    }

    async fn try_acquire_or_renew(&self) -> Result<bool, LeaderElectionError> {
        let api: Api<Lease> = Api::namespaced(self.client.clone(), &self.namespace);
        let now = Utc::now();

        let Some(lease) = api.get_opt(&self.lease_name).await? else {
            return self.write_lease(&api, None, now, 0).await;
        };

        let spec = lease.spec.as_ref();
        let resource_version = lease
            .metadata
            .resource_version
            .clone()
            .ok_or_else(|| LeaderElectionError::MissingResourceVersion(self.lease_name.clone()))?;

        if spec.and_then(|s| s.holder_identity.as_deref()) == Some(self.identity.as_str()) {
            return self.renew(&api, &lease, resource_version, now).await;
        }

        if lease_expired(spec, now) {
            let transitions = spec.and_then(|s| s.lease_transitions).unwrap_or(0);
            return self
                .write_lease(&api, Some(resource_version), now, transitions.saturating_add(1))
                .await;
        }

        Ok(false)
    }

    async fn renew(
        &self,
        api: &Api<Lease>,
        existing: &Lease,
        resource_version: String,
        now: DateTime<Utc>,
    ) -> Result<bool, LeaderElectionError> {
        let mut updated = existing.clone();
        if let Some(spec) = updated.spec.as_mut() {
            spec.renew_time = Some(MicroTime(now));
        }
        updated.metadata.resource_version = Some(resource_version);

        match api.replace(&self.lease_name, &self.post_params(), &updated).await {
            Ok(_) => {
                debug!(identity = %self.identity, "Lease renewed");
                Ok(true)
            }
            Err(kube::Error::Api(e)) if e.code == 409 => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Create the lease, or take over an expired one when `resource_version` is set
    async fn write_lease(
        &self,
        api: &Api<Lease>,
        resource_version: Option<String>,
        now: DateTime<Utc>,
        transitions: i32,
    ) -> Result<bool, LeaderElectionError> {
        let taking_over = resource_version.is_some();
        let lease = Lease {
            metadata: ObjectMeta {
                name: Some(self.lease_name.clone()),
                namespace: Some(self.namespace.clone()),
                resource_version,
                ..ObjectMeta::default()
            },
            spec: Some(LeaseSpec {
                holder_identity: Some(self.identity.clone()),
                lease_duration_seconds: i32::try_from(LEASE_DURATION.as_secs()).ok(),
                acquire_time: Some(MicroTime(now)),
                renew_time: Some(MicroTime(now)),
                lease_transitions: Some(transitions),
                ..LeaseSpec::default()
            }),
        };

        let result = if taking_over {
            api.replace(&self.lease_name, &self.post_params(), &lease).await
        } else {
            api.create(&self.post_params(), &lease).await
        };

        match result {
            Ok(_) => {
                info!(identity = %self.identity, transitions, "Lease written");
                Ok(true)
            }
            Err(kube::Error::Api(e)) if e.code == 409 => {
                debug!(identity = %self.identity, "Lease write conflict, will retry");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..PostParams::default()
        }
    }
}

/// Keeps the lease renewed while alive
#[derive(Debug)]
pub struct LeaderGuard {
    renewal_task: JoinHandle<()>,
    lost_rx: Option<oneshot::Receiver<()>>,
}

impl LeaderGuard {
    /// Wait until leadership is lost
    pub async fn lost(&mut self) {
        if let Some(rx) = self.lost_rx.take() {
            let _ = rx.await;
        }
    }
}

impl Drop for LeaderGuard {
    fn drop(&mut self) {
        self.renewal_task.abort();
    }
}
