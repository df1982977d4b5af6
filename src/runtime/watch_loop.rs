//! # Watch Loop
//!
//! Controller watch loop that monitors namespaces and triggers a reconcile
//! whenever one changes. Namespaces that existed before startup are
//! reconciled from the initial listing.

use crate::controller::reconciler::{reconcile, Reconciler};
use crate::controller::server::ServerState;
use crate::runtime::error_policy::{handle_reconciliation_error, log_controller_result};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::Api;
use kube_runtime::{controller, watcher, Controller};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, Instrument};

/// Run the namespace controller until a shutdown signal arrives
///
/// At most `concurrency` namespaces are reconciled at the same time; a
/// single namespace is never reconciled twice concurrently.
pub async fn run_watch_loop(
    namespaces: Api<Namespace>,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
    concurrency: u16,
) {
    let watch_span = tracing::span!(
        tracing::Level::INFO,
        "controller.watch",
        operation = "watch_loop"
    );

    info!(concurrency, "Starting namespace watch...");
    server_state.mark_ready();

    Controller::new(namespaces, watcher::Config::default())
        .with_config(controller::Config::default().concurrency(concurrency))
        .shutdown_on_signal()
        .run(reconcile, handle_reconciliation_error, reconciler)
        .for_each(|result| {
            log_controller_result(&result);
            futures::future::ready(())
        })
        .instrument(watch_span)
        .await;

    server_state.is_ready.store(false, Ordering::Relaxed);
    info!("Controller stopped gracefully");
}
