//! # Initialization
//!
//! Controller initialization logic including rustls setup, logging,
//! metrics, server startup, and Kubernetes client setup.

use crate::cluster::{ClusterStore, KubeStore};
use crate::config::ControllerConfig;
use crate::constants::{DEFAULT_SERVER_POLL_INTERVAL_MS, DEFAULT_SERVER_STARTUP_TIMEOUT_SECS};
use crate::controller::manifest::KindRegistry;
use crate::controller::reconciler::Reconciler;
use crate::controller::server::{parse_bind_address, start_server, ServerState};
use crate::observability::{logging, metrics};
use crate::runtime::leader_election::{leader_identity, LeaderElector};
use crate::runtime::watch_loop::run_watch_loop;
use anyhow::{anyhow, Context, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{api::Api, Client};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Options taken from the command line
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub metrics_addr: String,
    pub enable_leader_election: bool,
}

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    pub client: Client,
    /// API for namespaces across the cluster
    pub namespaces: Api<Namespace>,
    pub reconciler: Arc<Reconciler>,
    pub server_state: Arc<ServerState>,
    pub config: ControllerConfig,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("config", &self.config)
            .field(
                "server_ready",
                &self
                    .server_state
                    .is_ready
                    .load(std::sync::atomic::Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - Configuration from the environment
/// - Tracing subscriber setup
/// - Metrics registration
/// - HTTP server startup
/// - Kubernetes client creation
/// - Kind registry and reconciler setup
///
/// # Errors
///
/// Returns an error if any of these steps fails.
pub async fn initialize(options: &RuntimeOptions) -> Result<InitializationResult> {
    // Required for rustls 0.23+ when no default provider is set via features
    let provider_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();

    let config = ControllerConfig::from_env();
    logging::init_logging(&config)?;

    info!("Starting Namespace Provisioner");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    if !provider_installed {
        debug!("rustls crypto provider was already installed");
    }
    info!(
        config_namespace = %config.config_namespace,
        max_concurrent_reconciliations = config.max_concurrent_reconciliations,
        backoff_min = ?config.backoff_min_duration(),
        backoff_max = ?config.backoff_max_duration(),
        "Controller configuration loaded"
    );

    metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());
    let addr = parse_bind_address(&options.metrics_addr)?;
    let server_state_clone = Arc::clone(&server_state);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(addr, server_state_clone).await {
            error!("HTTP server error: {:#}", e);
        }
    });
    wait_for_server_ready(&server_state, &server_handle).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let registry = Arc::new(KindRegistry::builtin());
    info!("Registered {} resource kinds", registry.len());

    let store: Arc<dyn ClusterStore> =
        Arc::new(KubeStore::new(client.clone(), Arc::clone(&registry)));
    let reconciler = Arc::new(Reconciler::new(store, registry, &config));

    Ok(InitializationResult {
        namespaces: Api::all(client.clone()),
        client,
        reconciler,
        server_state,
        config,
    })
}

/// Initialize, optionally wait for leadership, then run the watch loop
///
/// # Errors
///
/// Returns an error if initialization fails or leadership is lost.
pub async fn run(options: RuntimeOptions) -> Result<()> {
    let init = initialize(&options).await?;

    if !options.enable_leader_election {
        run_watch_loop(
            init.namespaces,
            init.reconciler,
            init.server_state,
            init.config.max_concurrent_reconciliations,
        )
        .await;
        return Ok(());
    }

    let identity = leader_identity();
    let elector = Arc::new(LeaderElector::new(
        init.client.clone(),
        &init.config.pod_namespace,
        &identity,
    ));
    let mut guard = elector.acquire().await;

    tokio::select! {
        () = run_watch_loop(
            init.namespaces,
            init.reconciler,
            init.server_state,
            init.config.max_concurrent_reconciliations,
        ) => Ok(()),
        () = guard.lost() => Err(anyhow!("Leadership lost, shutting down")),
    }
}

async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
) -> Result<()> {
    let startup_timeout = Duration::from_secs(DEFAULT_SERVER_STARTUP_TIMEOUT_SECS);
    let poll_interval = Duration::from_millis(DEFAULT_SERVER_POLL_INTERVAL_MS);
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow!("HTTP server failed to start"));
        }

        if server_state.serving() {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }
}
