use std::future::Future;
use std::sync::Arc;

#[cfg(feature = "monitor")]
use axum::routing::MethodRouter;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::SupervisorConfig,
        dispatcher::ErrorHandler,
        health::{HealthAggregator, HealthCheck},
        supervisor::Supervisor,
    },
    error::{ConfigError, WorkerError},
    workers::{HandlerFn, HandlerRef, Worker, WorkerConfig},
};

/// Builder for registering workers and options before a [`Supervisor`] runs.
///
/// Every worker config is validated as it is registered, the monitor config on
/// [`build`](Self::build); nothing can fail mid-run because of configuration.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use workvisor::{Supervisor, SupervisorConfig, WorkerConfig};
///
/// # fn main() -> Result<(), workvisor::ConfigError> {
/// let sup = Supervisor::builder(SupervisorConfig::default())
///     .worker_fn("ticker", |_ctx: CancellationToken| async { Ok(()) }, WorkerConfig::default())?
///     .check_health(|| true)
///     .handle_error(|w, err| eprintln!("{} failed: {err}", w.name()))
///     .build()?;
///
/// assert_eq!(sup.workers().len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    workers: Vec<Arc<Worker>>,
    health: HealthAggregator,
    on_error: Option<ErrorHandler>,
    #[cfg(feature = "monitor")]
    routes: crate::monitor::RouteOverrides,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            workers: Vec::new(),
            health: HealthAggregator::new(),
            on_error: None,
            #[cfg(feature = "monitor")]
            routes: Default::default(),
        }
    }

    /// Registers a worker and its liveness as a health predicate.
    pub fn worker(
        mut self,
        name: impl Into<String>,
        handler: HandlerRef,
        config: WorkerConfig,
    ) -> Result<Self, ConfigError> {
        let worker = Arc::new(Worker::new(name, handler, config)?);
        let probe = Arc::clone(&worker);
        self.health.push(Arc::new(move || probe.healthy()));
        self.workers.push(worker);
        Ok(self)
    }

    /// Registers a closure-backed worker. See [`worker`](Self::worker).
    pub fn worker_fn<F, Fut>(
        self,
        name: impl Into<String>,
        f: F,
        config: WorkerConfig,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
    {
        self.worker(name, HandlerFn::arc(f), config)
    }

    /// Adds an external health predicate.
    pub fn check_health<F>(mut self, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        let check: HealthCheck = Arc::new(check);
        self.health.push(check);
        self
    }

    /// Sets the callback invoked once per failing handler invocation.
    pub fn handle_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(&Worker, &WorkerError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(on_error));
        self
    }

    /// Replaces the built-in `GET <base>/stats` handler.
    ///
    /// The route is still mounted only when `monitor.stats` is enabled.
    #[cfg(feature = "monitor")]
    pub fn stats_route(mut self, route: MethodRouter<Arc<Supervisor>>) -> Self {
        self.routes.stats = Some(route);
        self
    }

    /// Replaces the built-in `GET <base>/health-check` handler.
    ///
    /// The route is still mounted only when `monitor.health_check` is enabled.
    #[cfg(feature = "monitor")]
    pub fn health_check_route(mut self, route: MethodRouter<Arc<Supervisor>>) -> Self {
        self.routes.health_check = Some(route);
        self
    }

    /// Validates the monitor config and returns the supervisor.
    pub fn build(self) -> Result<Arc<Supervisor>, ConfigError> {
        self.cfg.monitor.validate()?;
        #[allow(unused_mut)]
        let mut sup = Supervisor::new_internal(self.cfg, self.workers, self.health, self.on_error);
        #[cfg(feature = "monitor")]
        {
            sup.routes = self.routes;
        }
        Ok(Arc::new(sup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_worker_adds_a_health_predicate() {
        let sup = SupervisorBuilder::new(SupervisorConfig::default())
            .worker_fn("a", |_ctx: CancellationToken| async { Ok(()) }, WorkerConfig::default())
            .unwrap()
            .worker_fn("b", |_ctx: CancellationToken| async { Ok(()) }, WorkerConfig::default())
            .unwrap()
            .check_health(|| true)
            .build()
            .unwrap();

        assert_eq!(sup.workers().len(), 2);
        assert_eq!(sup.health().len(), 3);
        // Not started yet: nothing is up.
        assert!(!sup.healthy());
    }

    #[test]
    fn invalid_worker_is_rejected_at_registration() {
        let res = SupervisorBuilder::new(SupervisorConfig::default()).worker_fn(
            "zero",
            |_ctx: CancellationToken| async { Ok(()) },
            WorkerConfig::default().with_concurrency(0),
        );
        assert!(matches!(res, Err(ConfigError::InvalidConcurrency { .. })));
    }

    #[test]
    fn invalid_monitor_is_rejected_at_build() {
        let mut cfg = SupervisorConfig::default();
        cfg.monitor.base_path = "no-slash".into();
        let res = SupervisorBuilder::new(cfg).build();
        assert!(matches!(res, Err(ConfigError::InvalidBasePath { .. })));
    }

    #[test]
    fn without_workers_health_is_vacuously_true() {
        let sup = SupervisorBuilder::new(SupervisorConfig::default())
            .build()
            .unwrap();
        assert!(sup.healthy());
    }
}
