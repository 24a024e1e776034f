//! # Registered worker.
//!
//! A [`Worker`] bundles identity (name + random id), the handler, its
//! [`WorkerConfig`] and the [`StatusTable`] its engine writes to. It is built at
//! registration time and read concurrently by the engine, the health aggregator
//! and the monitor.

use std::fmt;

use uuid::Uuid;

use crate::error::ConfigError;
use crate::workers::{HandlerRef, Status, StatusTable, WorkerConfig};

/// A named handler with its execution settings and live slot states.
pub struct Worker {
    id: Uuid,
    name: String,
    handler: HandlerRef,
    config: WorkerConfig,
    status: StatusTable,
}

impl Worker {
    /// Validates `config` and builds a worker with a fresh id.
    pub fn new(
        name: impl Into<String>,
        handler: HandlerRef,
        config: WorkerConfig,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        config.validate(&name)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            handler,
            config,
            status: StatusTable::new(),
        })
    }

    /// Unique id, stable for the lifetime of the worker.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Human-readable name (not required to be unique).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execution settings.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub(crate) fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    pub(crate) fn status_table(&self) -> &StatusTable {
        &self.status
    }

    /// Snapshot of every slot; empty until the engine starts.
    pub fn status(&self) -> Vec<Status> {
        self.status.snapshot()
    }

    /// True iff at least one slot is currently [`Status::Started`].
    pub fn is_up(&self) -> bool {
        self.status.any_started()
    }

    /// Liveness of the worker; same as [`is_up`](Self::is_up).
    ///
    /// A one-shot worker that finished successfully is therefore unhealthy.
    pub fn healthy(&self) -> bool {
        self.is_up()
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("config", &self.config)
            .field("status", &self.status)
            .finish()
    }
}
