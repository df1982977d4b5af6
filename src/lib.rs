//! Namespace Provisioner Library
//!
//! Watches namespaces and creates the resources their provisioning
//! annotations point at.
//!
//! - `cluster`: access to the Kubernetes API behind the [`cluster::ClusterStore`] trait
//! - `config`: controller configuration from the environment
//! - `controller`: manifest decoding, reconciliation and the HTTP server
//! - `observability`: logging and Prometheus metrics
//! - `runtime`: process wiring, leader election and the watch loop

pub mod cluster;
pub mod config;
pub mod constants;
pub mod controller;
pub mod observability;
pub mod runtime;
