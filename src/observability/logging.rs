//! # Logging
//!
//! `tracing` subscriber setup. `RUST_LOG` wins when set; otherwise the
//! filter follows `LOG_LEVEL`.

use crate::config::ControllerConfig;
use crate::constants::LOG_TARGET;
use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
#[must_use]
pub fn default_filter(config: &ControllerConfig) -> String {
    if config.debug_logging() {
        format!("{LOG_TARGET}=debug,kube=info")
    } else {
        format!("{LOG_TARGET}=info")
    }
}

/// Install the global `tracing` subscriber
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &ControllerConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config).into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_info() {
        assert_eq!(
            default_filter(&ControllerConfig::default()),
            "namespace_provisioner=info"
        );
    }

    #[test]
    fn test_debug_log_level_enables_debug_filter() {
        let config = ControllerConfig {
            log_level: "debug".to_string(),
            ..ControllerConfig::default()
        };
        assert!(default_filter(&config).starts_with("namespace_provisioner=debug"));
    }
}
