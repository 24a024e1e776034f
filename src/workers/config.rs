//! # Per-worker execution settings.
//!
//! Defines [`WorkerConfig`], the recognized options of a worker:
//!
//! | option           | type                  | default |
//! |------------------|-----------------------|---------|
//! | `concurrency`    | `usize` (≥ 1)         | `1`     |
//! | `timeout`        | `Option<Duration>`    | `None`  |
//! | `deadline`       | `Option<SystemTime>`  | `None`  |
//! | `restart_always` | `bool`                | `false` |
//!
//! A config starts from [`WorkerConfig::default`] and is refined with the
//! `with_*` methods; anything not set keeps its default. It is validated once
//! when the worker is registered and never changes afterwards.
//!
//! ## Sentinel values
//! - `timeout = Some(0s)` → no timeout (same as `None`)

use std::time::{Duration, SystemTime};

use crate::error::ConfigError;

/// Execution settings of a worker.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use workvisor::WorkerConfig;
///
/// let cfg = WorkerConfig::default()
///     .with_concurrency(4)
///     .with_timeout(Duration::from_secs(2))
///     .with_restart_always(true);
///
/// assert_eq!(cfg.concurrency(), 4);
/// assert!(cfg.deadline().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerConfig {
    concurrency: usize,
    timeout: Option<Duration>,
    deadline: Option<SystemTime>,
    restart_always: bool,
}

impl Default for WorkerConfig {
    /// One slot, no timeout, no deadline, no restart.
    fn default() -> Self {
        Self {
            concurrency: 1,
            timeout: None,
            deadline: None,
            restart_always: false,
        }
    }
}

impl WorkerConfig {
    /// Number of concurrent slots.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Per-invocation timeout, if configured (a zero duration reads as `None`).
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.filter(|d| !d.is_zero())
    }

    /// Absolute deadline shared by every invocation, if configured.
    pub fn deadline(&self) -> Option<SystemTime> {
        self.deadline
    }

    /// Whether slots relaunch after every completion.
    pub fn restart_always(&self) -> bool {
        self.restart_always
    }

    /// Returns a config with `concurrency` slots.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Returns a config with a per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns a config with an absolute deadline.
    pub fn with_deadline(mut self, deadline: SystemTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns a config with the restart-always flag set to `restart_always`.
    pub fn with_restart_always(mut self, restart_always: bool) -> Self {
        self.restart_always = restart_always;
        self
    }

    /// Rejects settings a worker cannot run with.
    pub fn validate(&self, worker: &str) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency {
                worker: worker.to_string(),
                concurrency: self.concurrency,
            });
        }
        Ok(())
    }
}
