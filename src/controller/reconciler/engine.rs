//! # Reconcile Engine
//!
//! Drives one namespace through the provisioning pipeline:
//!
//! 1. Fetch the namespace (gone → nothing to do)
//! 2. Skip unless the namespace is `Active`
//! 3. Read the provisioning annotations (none → nothing to do)
//! 4. Resolve the named config maps and secrets into blobs
//! 5. Decode each blob document by document and create what is missing
//!
//! Any failure aborts the pass. Resources created before the failure stay
//! in place; the next pass skips them as already existing.

use super::annotations::annotation_specs;
use super::apply::IdempotentCreator;
use super::error::ReconcilerError;
use super::sources::SourceResolver;
use super::types::{ConfigBlob, CreationOutcome, NamespaceEvent, NamespacePhase, ReconcileSummary};
use crate::cluster::ClusterStore;
use crate::config::ControllerConfig;
use crate::controller::backoff::BackoffState;
use crate::controller::manifest::{decode_documents, KindRegistry};
use crate::observability::metrics;
use k8s_openapi::api::core::v1::Namespace;
use kube_runtime::controller::Action;
use kube::ResourceExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, Instrument};

/// Shared context handed to every reconcile
pub struct Reconciler {
    store: Arc<dyn ClusterStore>,
    registry: Arc<KindRegistry>,
    config_namespace: String,
    backoff_min_secs: u64,
    backoff_max_secs: u64,
    // Keyed by namespace name
    backoff_states: Mutex<HashMap<String, BackoffState>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config_namespace", &self.config_namespace)
            .field("registered_kinds", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(
        store: Arc<dyn ClusterStore>,
        registry: Arc<KindRegistry>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            store,
            registry,
            config_namespace: config.config_namespace.clone(),
            backoff_min_secs: config.backoff_min_secs,
            backoff_max_secs: config.backoff_max_secs,
            backoff_states: Mutex::new(HashMap::new()),
        }
    }

    /// Run one reconcile pass for the named namespace
    ///
    /// # Errors
    ///
    /// Returns the first error hit by the pipeline. A namespace that no
    /// longer exists is not an error.
    pub async fn reconcile_namespace(
        &self,
        name: &str,
    ) -> Result<ReconcileSummary, ReconcilerError> {
        let start = Instant::now();
        metrics::increment_reconciliations();

        let result = self
            .run(name)
            .instrument(info_span!("reconcile", namespace = %name))
            .await;

        metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

        if let Ok(summary) = &result {
            self.reset_backoff(name);
            match summary {
                ReconcileSummary::Provisioned { created, existing } => info!(
                    namespace = %name,
                    created,
                    existing,
                    "Reconciliation complete (duration: {:.2}s)",
                    start.elapsed().as_secs_f64()
                ),
                other => debug!(namespace = %name, summary = ?other, "Nothing to provision"),
            }
        }
        result
    }

    /// Delay before retrying a namespace whose last reconcile failed
    ///
    /// Returns the delay and the number of consecutive failures so far.
    pub fn next_retry_delay(&self, name: &str) -> (Duration, u32) {
        let mut states = self
            .backoff_states
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let state = states
            .entry(name.to_string())
            .or_insert_with(|| BackoffState::new(self.backoff_min_secs, self.backoff_max_secs));
        let delay = state.record_error();
        (delay, state.error_count)
    }

    fn reset_backoff(&self, name: &str) {
        let mut states = self
            .backoff_states
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if states.remove(name).is_some() {
            debug!(namespace = %name, "Reset error backoff");
        }
    }

    async fn run(&self, name: &str) -> Result<ReconcileSummary, ReconcilerError> {
        let namespace = match self.store.get_namespace(name).await {
            Ok(Some(namespace)) => namespace,
            Ok(None) => {
                info!("Namespace {} not found, probably deleted", name);
                return Ok(ReconcileSummary::NamespaceGone);
            }
            Err(source) => {
                return Err(ReconcilerError::NamespaceFetch {
                    namespace: name.to_string(),
                    source,
                })
            }
        };

        let event = NamespaceEvent::from_namespace(&namespace, name);
        if event.phase != NamespacePhase::Active {
            debug!("Namespace {} is in phase {}, skipping", event.name, event.phase);
            return Ok(ReconcileSummary::NotActive { phase: event.phase });
        }

        let specs = annotation_specs(&event);
        if specs.is_empty() {
            debug!("Namespace {} has no provisioning annotation", event.name);
            return Ok(ReconcileSummary::NotAnnotated);
        }

        let blobs = SourceResolver::new(self.store.as_ref(), &self.config_namespace)
            .aggregate(&specs)
            .await?;
        self.provision(&event.name, &blobs).await
    }

    async fn provision(
        &self,
        target_namespace: &str,
        blobs: &[ConfigBlob],
    ) -> Result<ReconcileSummary, ReconcilerError> {
        let creator = IdempotentCreator::new(self.store.as_ref());
        let mut created = 0;
        let mut existing = 0;

        for blob in blobs {
            debug!(origin = %blob, "Provisioning entry");
            for decoded in decode_documents(&blob.content, &self.registry) {
                let resource = decoded.map_err(|source| ReconcilerError::Decode {
                    origin: blob.to_string(),
                    source,
                })?;
                match creator.apply(resource, target_namespace).await? {
                    CreationOutcome::Created => {
                        created += 1;
                        metrics::increment_resources_created();
                    }
                    CreationOutcome::AlreadyExists => {
                        existing += 1;
                        metrics::increment_resources_existing();
                    }
                }
            }
        }

        Ok(ReconcileSummary::Provisioned { created, existing })
    }
}

/// Reconcile entry point for the namespace controller
///
/// # Errors
///
/// Propagates [`ReconcilerError`] to the error policy, which schedules the retry.
pub async fn reconcile(
    namespace: Arc<Namespace>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    ctx.reconcile_namespace(&namespace.name_any()).await?;
    Ok(Action::await_change())
}
