//! # Error Policy
//!
//! Error handling and backoff logic for the controller watch loop.
//! Failed reconciles are requeued after a per-namespace Fibonacci backoff;
//! errors surfaced by the controller stream itself are only logged.

use crate::controller::reconciler::{Reconciler, ReconcilerError};
use crate::observability::metrics;
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use kube_runtime::controller::{self, Action};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::watcher;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Item yielded by the namespace controller stream
pub type ControllerResult =
    Result<(ObjectRef<Namespace>, Action), controller::Error<ReconcilerError, watcher::Error>>;

/// Handle reconciliation errors with Fibonacci backoff
///
/// Backoff state is tracked per namespace, so one failing namespace never
/// delays the others. A later successful reconcile resets it.
pub fn handle_reconciliation_error(
    namespace: Arc<Namespace>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = namespace.name_any();

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        namespace = name.as_str(),
        reason = error.reason()
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for namespace {}: {}", name, error);
    metrics::increment_reconciliation_errors();

    let (delay, error_count) = ctx.next_retry_delay(&name);
    let next_trigger_time = chrono::TimeDelta::from_std(delay)
        .ok()
        .and_then(|delta| chrono::Utc::now().checked_add_signed(delta));

    info!(
        "Retrying with Fibonacci backoff: {}s (error count: {}, trigger source: error-backoff)",
        delay.as_secs(),
        error_count
    );
    if let Some(next) = next_trigger_time {
        info!("Next retry scheduled: {}", next.to_rfc3339());
    }

    metrics::increment_requeues(error.reason());
    Action::requeue(delay)
}

/// Log one item of the controller stream
///
/// Reconcile failures were already reported by [`handle_reconciliation_error`].
pub fn log_controller_result(result: &ControllerResult) {
    match result {
        Ok((object, action)) => {
            debug!(namespace = %object.name, action = ?action, "watch.event.reconciled");
        }
        Err(controller::Error::ReconcilerFailed(err, object)) => {
            debug!(namespace = %object.name, error = %err, "watch.event.reconciliation_failed");
        }
        Err(controller::Error::ObjectNotFound(object)) => {
            debug!(
                namespace = %object.name,
                "Namespace vanished before it could be reconciled"
            );
        }
        Err(controller::Error::QueueError(err)) => {
            warn!(error = %err, "Namespace watch error, the watch will be retried");
        }
        Err(err) => {
            error!(error = %err, "Controller stream error");
        }
    }
}
