//! # Runtime
//!
//! Process-level wiring around the reconciler.
//!
//! - `initialization`: crypto provider, logging, metrics, HTTP server and client setup
//! - `leader_election`: Lease-based leader election
//! - `watch_loop`: the namespace controller
//! - `error_policy`: requeue decisions for failed reconciles

pub mod error_policy;
pub mod initialization;
pub mod leader_election;
pub mod watch_loop;
