//! # Namespace Provisioner
//!
//! A Kubernetes controller that provisions resources into namespaces.
//!
//! ## Overview
//!
//! Namespaces opt in through annotations naming config maps and secrets in
//! a fixed configuration namespace (`CONFIG_NAMESPACE`):
//!
//! ```yaml
//! metadata:
//!   annotations:
//!     namespace-provisioner.daimler-tss.com/config: team-defaults,network-policies
//!     namespace-provisioner.daimler-tss.com/secret: registry-credentials
//! ```
//!
//! Every entry of those objects holds one or more YAML or JSON manifests
//! separated by `---`. Each manifest is created in the annotated namespace
//! unless a resource with the same identity already exists there.

use anyhow::Result;
use clap::Parser;
use namespace_provisioner::constants::DEFAULT_METRICS_ADDR;
use namespace_provisioner::runtime::initialization::{run, RuntimeOptions};

/// Provisions template resources into annotated namespaces
#[derive(Debug, Parser)]
#[command(name = "namespace-provisioner", version, about, long_about = None)]
struct Cli {
    /// Address the metrics and health endpoints bind to; `:PORT` binds all interfaces
    #[arg(long, default_value = DEFAULT_METRICS_ADDR)]
    metrics_addr: String,

    /// Only run the controller while holding the leader lease
    #[arg(long, default_value_t = false)]
    enable_leader_election: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(RuntimeOptions {
        metrics_addr: cli.metrics_addr,
        enable_leader_election: cli.enable_leader_election,
    })
    .await
}
