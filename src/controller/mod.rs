//! # Controller
//!
//! Core controller modules for the namespace provisioner.
//!
//! - `backoff`: Fibonacci backoff for retries after failed reconciles
//! - `manifest`: Splitting and decoding of manifest templates
//! - `reconciler`: Core reconciliation logic
//! - `server`: HTTP server for metrics and health checks

pub mod backoff;
pub mod manifest;
pub mod reconciler;
pub mod server;
