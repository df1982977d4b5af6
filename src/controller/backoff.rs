//! # Fibonacci Backoff
//!
//! Retry delays for namespaces whose reconcile keeps failing. Delays follow
//! the Fibonacci sequence starting at the minimum and are capped at the
//! maximum, e.g. with 5s/300s: 5s, 5s, 10s, 15s, 25s, 40s, ... 300s.
//!
//! ```rust
//! use namespace_provisioner::controller::backoff::FibonacciBackoff;
//! use std::time::Duration;
//!
//! let mut backoff = FibonacciBackoff::new(5, 300);
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(5));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(5));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
//! ```

use std::time::Duration;

/// Fibonacci backoff calculator, in whole seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FibonacciBackoff {
    min_secs: u64,
    max_secs: u64,
    prev_secs: u64,
    current_secs: u64,
}

impl FibonacciBackoff {
    /// Create a backoff; `min_secs` is raised to 1 and `max_secs` to at least `min_secs`
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        let min_secs = min_secs.max(1);
        Self {
            min_secs,
            max_secs: max_secs.max(min_secs),
            prev_secs: 0,
            current_secs: min_secs,
        }
    }

    /// Current delay in seconds; advances the sequence
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let result = self.current_secs;
        let next = self.prev_secs.saturating_add(self.current_secs);
        self.prev_secs = self.current_secs;
        self.current_secs = next.min(self.max_secs);
        result
    }

    /// Current delay; advances the sequence
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_secs(self.next_backoff_seconds())
    }

    /// Start over from the minimum
    pub fn reset(&mut self) {
        self.prev_secs = 0;
        self.current_secs = self.min_secs;
    }
}

/// Backoff bookkeeping for one namespace
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_secs, max_secs),
            error_count: 0,
        }
    }

    /// Record a failure and return the delay before the next attempt
    pub fn record_error(&mut self) -> Duration {
        self.error_count = self.error_count.saturating_add(1);
        self.backoff.next_backoff()
    }
}
