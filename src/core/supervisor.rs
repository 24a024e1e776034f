//! # Supervisor: runs every worker engine, dispatches failures, stops gracefully.
//!
//! The [`Supervisor`] owns the root cancellation token, the registered workers,
//! the error callback and the health aggregator. [`run_all`] is the orchestration
//! core and can also be used on its own.
//!
//! ## High-level architecture
//! ```text
//! Supervisor::run()
//!   ├─► monitor::start()            (if stats / health-check enabled)
//!   ├─► signal listener             (if handle_signals)
//!   └─► run_all(root, workers, on_error)
//!         ├─► Dispatcher::run()     (single consumer of the failure sink)
//!         └─► WorkerEngine::run()   (one per worker, child token of root)
//!               └─► slot × concurrency ── FailureRecord ──► FailureSink
//!
//! Graceful stop:
//!   stop() ──► root.cancel() ──► each slot exits at its next completion boundary
//!                              ──► run_all returns once every engine exited
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use workvisor::{Supervisor, SupervisorConfig, WorkerConfig, WorkerError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::builder(SupervisorConfig::default())
//!         .worker_fn(
//!             "ticker",
//!             |ctx: CancellationToken| async move {
//!                 tokio::select! {
//!                     _ = ctx.cancelled() => Err(WorkerError::Canceled),
//!                     _ = tokio::time::sleep(Duration::from_millis(10)) => Ok(()),
//!                 }
//!             },
//!             WorkerConfig::default().with_restart_always(true),
//!         )?
//!         .build()?;
//!
//!     let stopper = sup.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         stopper.stop();
//!     });
//!
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    core::{
        builder::SupervisorBuilder,
        config::SupervisorConfig,
        dispatcher::{self, ErrorHandler},
        engine::WorkerEngine,
        health::HealthAggregator,
        info::{SupervisorInfo, WorkerInfo},
        shutdown,
    },
    error::RuntimeError,
    workers::Worker,
};

/// Runs every worker under `root` until each engine has permanently exited.
///
/// Failures are delivered through a sink of `failure_buffer` records (min 1) to
/// `on_error`, or dropped when it is `None`. Worker failures never end the run
/// early; only cancelling `root` does.
pub async fn run_all(
    root: &CancellationToken,
    workers: &[Arc<Worker>],
    on_error: Option<ErrorHandler>,
    failure_buffer: usize,
) {
    let (sink, dispatcher) = dispatcher::channel(failure_buffer, on_error);
    let dispatch = tokio::spawn(dispatcher.run());

    let mut set = JoinSet::new();
    for worker in workers {
        let engine = WorkerEngine::new(Arc::clone(worker), sink.clone());
        set.spawn(engine.run(root.child_token()));
    }
    drop(sink);

    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            error!(error = %e, "worker engine aborted");
        }
    }

    match dispatch.await {
        Ok(received) => debug!(failures = received, "failure dispatcher drained"),
        Err(e) => error!(error = %e, "failure dispatcher aborted"),
    }
}

/// Coordinates worker engines, failure dispatch, health and graceful stop.
///
/// Built with [`Supervisor::builder`]; runs at most once.
pub struct Supervisor {
    cfg: SupervisorConfig,
    workers: Vec<Arc<Worker>>,
    health: HealthAggregator,
    on_error: Option<ErrorHandler>,
    root: CancellationToken,
    started: AtomicBool,
    #[cfg(feature = "monitor")]
    pub(crate) routes: crate::monitor::RouteOverrides,
}

impl Supervisor {
    /// Starts registering workers.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: SupervisorConfig,
        workers: Vec<Arc<Worker>>,
        health: HealthAggregator,
        on_error: Option<ErrorHandler>,
    ) -> Self {
        Self {
            cfg,
            workers,
            health,
            on_error,
            root: CancellationToken::new(),
            started: AtomicBool::new(false),
            #[cfg(feature = "monitor")]
            routes: Default::default(),
        }
    }

    /// Runs every registered worker until all of them exit or [`stop`](Self::stop) is
    /// called and every slot observed it.
    ///
    /// Starts the monitor first when enabled; a bind failure is returned before any
    /// worker starts and leaves the supervisor ready for another `run`.
    pub async fn run(self: &Arc<Self>) -> Result<(), RuntimeError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyRunning);
        }

        #[cfg(feature = "monitor")]
        let monitor = match crate::monitor::start(Arc::clone(self)).await {
            Ok(monitor) => monitor,
            Err(e) => {
                self.started.store(false, Ordering::Release);
                return Err(e);
            }
        };

        let signals = self.cfg.handle_signals.then(|| self.spawn_signal_listener());

        info!(workers = self.workers.len(), "supervisor started");
        run_all(
            &self.root,
            &self.workers,
            self.on_error.clone(),
            self.cfg.failure_buffer_clamped(),
        )
        .await;
        info!("all workers stopped");

        if let Some(listener) = signals {
            listener.abort();
        }

        #[cfg(feature = "monitor")]
        {
            if let Some(monitor) = monitor {
                monitor.shutdown().await?;
            }
        }
        Ok(())
    }

    /// Arms graceful stop and returns immediately.
    ///
    /// Slots finish their current invocation and do not relaunch. Calling it more
    /// than once has no further effect.
    pub fn stop(&self) {
        if !self.root.is_cancelled() {
            info!("graceful stop requested");
        }
        self.root.cancel();
    }

    /// True once [`stop`](Self::stop) was called (or a signal was received).
    pub fn is_stopping(&self) -> bool {
        self.root.is_cancelled()
    }

    /// Aggregate health: every worker up and every external predicate true.
    pub fn healthy(&self) -> bool {
        self.health.healthy()
    }

    /// Registered workers in registration order.
    pub fn workers(&self) -> &[Arc<Worker>] {
        &self.workers
    }

    /// Supervisor configuration.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Serializable snapshot of health, workers and monitor settings.
    pub fn infos(&self) -> SupervisorInfo {
        SupervisorInfo {
            healthy: self.healthy(),
            workers: self.workers.iter().map(|w| WorkerInfo::from(w.as_ref())).collect(),
            monitor: self.cfg.monitor.clone(),
        }
    }

    /// Health predicates behind [`healthy`](Self::healthy).
    pub fn health(&self) -> &HealthAggregator {
        &self.health
    }

    #[cfg(feature = "monitor")]
    pub(crate) fn route_overrides(&self) -> &crate::monitor::RouteOverrides {
        &self.routes
    }

    fn spawn_signal_listener(&self) -> tokio::task::JoinHandle<()> {
        let root = self.root.clone();
        tokio::spawn(async move {
            tokio::select! {
                res = shutdown::wait_for_shutdown_signal() => match res {
                    Ok(signal) => {
                        info!(signal, "shutdown signal received");
                        root.cancel();
                    }
                    Err(e) => warn!(error = %e, "failed to install signal handlers"),
                },
                _ = root.cancelled() => {}
            }
        })
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("cfg", &self.cfg)
            .field("workers", &self.workers)
            .field("stopping", &self.is_stopping())
            .finish()
    }
}
