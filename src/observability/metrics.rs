//! # Metrics
//!
//! Prometheus metrics for monitoring the provisioner.
//!
//! ## Metrics Exposed
//!
//! - `namespace_provisioner_reconciliations_total` - Total number of reconciliations
//! - `namespace_provisioner_reconciliation_errors_total` - Total number of reconciliation errors
//! - `namespace_provisioner_reconciliation_duration_seconds` - Duration of reconciliations
//! - `namespace_provisioner_resources_created_total` - Resources created from templates
//! - `namespace_provisioner_resources_existing_total` - Template resources found already present
//! - `namespace_provisioner_requeues_total` - Requeues scheduled by the error policy, by reason

use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "namespace_provisioner_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "namespace_provisioner_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "namespace_provisioner_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static RESOURCES_CREATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "namespace_provisioner_resources_created_total",
        "Total number of resources created from templates",
    )
    .expect("Failed to create RESOURCES_CREATED_TOTAL metric - this should never happen")
});

static RESOURCES_EXISTING_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "namespace_provisioner_resources_existing_total",
        "Total number of template resources that already existed",
    )
    .expect("Failed to create RESOURCES_EXISTING_TOTAL metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "namespace_provisioner_requeues_total",
            "Total number of requeues scheduled after a failed reconciliation",
        ),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

/// Register all metrics with the registry
///
/// # Errors
///
/// Returns an error if a metric is already registered.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(RESOURCES_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RESOURCES_EXISTING_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;
    Ok(())
}

/// Gather everything registered so far
#[must_use]
pub fn gather() -> Vec<prometheus::proto::MetricFamily> {
    REGISTRY.gather()
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_resources_created() {
    RESOURCES_CREATED_TOTAL.inc();
}

pub fn increment_resources_existing() {
    RESOURCES_EXISTING_TOTAL.inc();
}

pub fn increment_requeues(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}
