//! Error types used by the workvisor runtime and worker handlers.
//!
//! This module defines three enums:
//!
//! - [`RuntimeError`]: errors raised by the supervisor itself.
//! - [`ConfigError`]: configuration rejected before any worker starts.
//! - [`WorkerError`]: failures returned by a single handler invocation.
//!
//! All of them provide `as_label` for logs/metrics.

use std::fmt::Display;

use thiserror::Error;

/// # Errors produced by the workvisor runtime.
///
/// Worker failures never show up here: they are reported through the
/// error callback and never abort a run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The supervisor was asked to run a second time.
    #[error("supervisor is already running or has already run")]
    AlreadyRunning,

    /// The monitor listener could not be bound.
    #[error("failed to bind monitor on {addr}: {source}")]
    MonitorBind {
        /// Address that was requested.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The monitor server stopped with an I/O error.
    #[error("monitor server failed: {0}")]
    Monitor(#[source] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use workvisor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::AlreadyRunning.as_label(), "runtime_already_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Config(e) => e.as_label(),
            RuntimeError::AlreadyRunning => "runtime_already_running",
            RuntimeError::MonitorBind { .. } => "runtime_monitor_bind",
            RuntimeError::Monitor(_) => "runtime_monitor_failed",
        }
    }

    pub(crate) fn bind(addr: impl Display, source: std::io::Error) -> Self {
        RuntimeError::MonitorBind {
            addr: addr.to_string(),
            source,
        }
    }
}

/// # Configuration rejected at registration or build time.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A worker was configured with fewer than one slot.
    #[error("worker {worker:?}: concurrency must be at least 1, got {concurrency}")]
    InvalidConcurrency {
        /// Worker name.
        worker: String,
        /// Rejected value.
        concurrency: usize,
    },

    /// Monitor base path is not of the form `/segment[/segment...]`.
    #[error("monitor base path {path:?} must start with '/' and must not end with '/'")]
    InvalidBasePath {
        /// Rejected value.
        path: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidConcurrency { .. } => "config_invalid_concurrency",
            ConfigError::InvalidBasePath { .. } => "config_invalid_base_path",
        }
    }
}

/// # Failure of one handler invocation.
///
/// Any variant moves the slot to [`Status::Errored`](crate::Status::Errored)
/// and is delivered once to the error callback.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// Handler reported a failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Handler observed its cancellation token and gave up.
    #[error("context cancelled")]
    Canceled,

    /// Handler panicked; the panic was caught at the slot boundary.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Panic payload, when it was a string.
        info: String,
    },
}

impl WorkerError {
    /// Builds a [`WorkerError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use workvisor::WorkerError;
    ///
    /// let err = WorkerError::fail("connection refused");
    /// assert_eq!(err.to_string(), "execution failed: connection refused");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        WorkerError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Canceled => "worker_canceled",
            WorkerError::Panicked { .. } => "worker_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkerError::Fail { error } => format!("error: {error}"),
            WorkerError::Canceled => "context cancelled".to_string(),
            WorkerError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Converts a caught panic payload into [`WorkerError::Panicked`].
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let info = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        WorkerError::Panicked { info }
    }
}

impl From<std::io::Error> for WorkerError {
    fn from(e: std::io::Error) -> Self {
        WorkerError::fail(e)
    }
}
