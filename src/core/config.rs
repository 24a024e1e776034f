//! # Supervisor-wide configuration.
//!
//! Provides [`SupervisorConfig`] (runtime settings) and [`MonitorConfig`]
//! (HTTP monitoring endpoints). Per-worker settings live in
//! [`WorkerConfig`](crate::WorkerConfig).
//!
//! ## Sentinel values
//! - `failure_buffer = 0` → clamped to 1 (the sink always has one slot)
//! - `base_path = ""` → endpoints mounted at the root

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `failure_buffer`: capacity of the failure sink. Once full, a failing slot
///   waits for the dispatcher before it can relaunch.
/// - `handle_signals`: stop gracefully on SIGINT/SIGTERM/SIGQUIT (Ctrl-C on
///   non-unix platforms).
/// - `monitor`: HTTP monitoring endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Capacity of the failure sink (min 1).
    pub failure_buffer: usize,

    /// Arm graceful stop on OS termination signals.
    pub handle_signals: bool,

    /// Monitoring endpoints.
    pub monitor: MonitorConfig,
}

impl SupervisorConfig {
    /// Returns the failure sink capacity clamped to a minimum of 1.
    #[inline]
    pub fn failure_buffer_clamped(&self) -> usize {
        self.failure_buffer.max(1)
    }
}

/// Settings of the HTTP monitoring endpoints.
///
/// Every field has a default, so a partial config merges over the defaults:
/// ```rust
/// use workvisor::MonitorConfig;
///
/// let cfg: MonitorConfig = serde_json::from_str(r#"{ "port": 9000, "health_check": true }"#).unwrap();
/// assert_eq!(cfg.port, 9000);
/// assert_eq!(cfg.host, "localhost");
/// assert_eq!(cfg.base_path, "/workers");
/// assert!(!cfg.stats);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind (`0` picks a free port).
    pub port: u16,
    /// Prefix of every endpoint, e.g. `/workers`.
    pub base_path: String,
    /// Expose `GET <base_path>/stats`.
    pub stats: bool,
    /// Expose `GET <base_path>/health-check`.
    pub health_check: bool,
}

impl Default for MonitorConfig {
    /// `localhost:8001`, base path `/workers`, every endpoint disabled.
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8001,
            base_path: "/workers".to_string(),
            stats: false,
            health_check: false,
        }
    }
}

impl MonitorConfig {
    /// True if at least one endpoint is enabled.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.stats || self.health_check
    }

    /// `host:port` to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Rejects base paths that cannot be mounted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = &self.base_path;
        if path.is_empty() {
            return Ok(());
        }
        if !path.starts_with('/') || path.ends_with('/') {
            return Err(ConfigError::InvalidBasePath { path: path.clone() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SupervisorConfig::default();
        assert_eq!(cfg.failure_buffer_clamped(), 1);
        assert!(!cfg.handle_signals);
        assert!(!cfg.monitor.enabled());
        assert_eq!(cfg.monitor.addr(), "localhost:8001");
    }

    #[test]
    fn partial_config_merges_over_defaults() {
        let cfg: SupervisorConfig =
            serde_json::from_str(r#"{ "failure_buffer": 16, "monitor": { "stats": true } }"#)
                .unwrap();
        assert_eq!(cfg.failure_buffer_clamped(), 16);
        assert!(cfg.monitor.stats);
        assert!(cfg.monitor.enabled());
        assert_eq!(cfg.monitor.base_path, "/workers");
        assert_eq!(cfg.monitor.port, 8001);
    }

    #[test]
    fn base_path_validation() {
        let mut cfg = MonitorConfig::default();
        assert!(cfg.validate().is_ok());

        cfg.base_path = String::new();
        assert!(cfg.validate().is_ok());

        cfg.base_path = "workers".into();
        assert!(cfg.validate().is_err());

        cfg.base_path = "/workers/".into();
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidBasePath {
                path: "/workers/".into()
            })
        );
    }
}
