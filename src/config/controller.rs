//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_BACKOFF_MAX_SECS, DEFAULT_BACKOFF_MIN_SECS, DEFAULT_CONFIG_NAMESPACE,
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
};
use std::time::Duration;

/// Controller-level configuration
///
/// All settings have defaults and can be overridden via environment variables.
/// Environment variables are usually populated from the deployment manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace holding the template config maps and secrets (`CONFIG_NAMESPACE`)
    pub config_namespace: String,
    /// Global log level (`LOG_LEVEL`); `DEBUG` enables verbose logging
    pub log_level: String,
    /// Maximum concurrent reconciliations across namespaces
    pub max_concurrent_reconciliations: u16,
    /// Minimum error backoff in seconds
    pub backoff_min_secs: u64,
    /// Maximum error backoff in seconds
    pub backoff_max_secs: u64,
    /// Namespace the controller runs in (`POD_NAMESPACE`), used for the leader lease
    pub pod_namespace: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            config_namespace: DEFAULT_CONFIG_NAMESPACE.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            max_concurrent_reconciliations: DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
            pod_namespace: "default".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let backoff_min_secs =
            parse_or_default(lookup("BACKOFF_MIN_SECS"), defaults.backoff_min_secs).max(1);
        let backoff_max_secs =
            parse_or_default(lookup("BACKOFF_MAX_SECS"), defaults.backoff_max_secs)
                .max(backoff_min_secs);

        Self {
            config_namespace: lookup("CONFIG_NAMESPACE")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.config_namespace),
            log_level: lookup("LOG_LEVEL")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.log_level),
            max_concurrent_reconciliations: parse_or_default(
                lookup("MAX_CONCURRENT_RECONCILIATIONS"),
                defaults.max_concurrent_reconciliations,
            ),
            backoff_min_secs,
            backoff_max_secs,
            pod_namespace: lookup("POD_NAMESPACE")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.pod_namespace),
        }
    }

    /// Whether verbose (debug) logging was requested
    #[must_use]
    pub fn debug_logging(&self) -> bool {
        self.log_level.eq_ignore_ascii_case("DEBUG")
    }

    /// Minimum error backoff duration
    #[must_use]
    pub fn backoff_min_duration(&self) -> Duration {
        Duration::from_secs(self.backoff_min_secs)
    }

    /// Maximum error backoff duration
    #[must_use]
    pub fn backoff_max_duration(&self) -> Duration {
        Duration::from_secs(self.backoff_max_secs)
    }
}

fn parse_or_default<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ControllerConfig::from_lookup(|_| None);
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.config_namespace, "default");
        assert_eq!(config.log_level, "INFO");
        assert!(!config.debug_logging());
    }

    #[test]
    fn test_values_from_environment() {
        let config = ControllerConfig::from_lookup(lookup_from(&[
            ("CONFIG_NAMESPACE", "config-namespace"),
            ("LOG_LEVEL", "DEBUG"),
            ("MAX_CONCURRENT_RECONCILIATIONS", "3"),
            ("BACKOFF_MIN_SECS", "2"),
            ("BACKOFF_MAX_SECS", "60"),
            ("POD_NAMESPACE", "kube-system"),
        ]));
        assert_eq!(config.config_namespace, "config-namespace");
        assert!(config.debug_logging());
        assert_eq!(config.max_concurrent_reconciliations, 3);
        assert_eq!(config.backoff_min_duration(), Duration::from_secs(2));
        assert_eq!(config.backoff_max_duration(), Duration::from_secs(60));
        assert_eq!(config.pod_namespace, "kube-system");
    }

    #[test]
    fn test_debug_logging_is_case_insensitive() {
        let config = ControllerConfig::from_lookup(lookup_from(&[("LOG_LEVEL", "debug")]));
        assert!(config.debug_logging());
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = ControllerConfig::from_lookup(lookup_from(&[
            ("MAX_CONCURRENT_RECONCILIATIONS", "many"),
            ("BACKOFF_MIN_SECS", "-4"),
        ]));
        assert_eq!(
            config.max_concurrent_reconciliations,
            DEFAULT_MAX_CONCURRENT_RECONCILIATIONS
        );
        assert_eq!(config.backoff_min_secs, DEFAULT_BACKOFF_MIN_SECS);
    }

    #[test]
    fn test_backoff_max_never_below_min() {
        let config = ControllerConfig::from_lookup(lookup_from(&[
            ("BACKOFF_MIN_SECS", "30"),
            ("BACKOFF_MAX_SECS", "10"),
        ]));
        assert_eq!(config.backoff_min_secs, 30);
        assert_eq!(config.backoff_max_secs, 30);
    }

    #[test]
    fn test_empty_config_namespace_uses_default() {
        let config = ControllerConfig::from_lookup(lookup_from(&[("CONFIG_NAMESPACE", "")]));
        assert_eq!(config.config_namespace, "default");
    }
}
