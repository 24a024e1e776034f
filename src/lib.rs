//! # workvisor
//!
//! **Workvisor** runs a fixed set of named, long-lived async workers inside one
//! process and supervises them.
//!
//! Each worker runs `concurrency` independent slots of the same handler. A slot
//! runs one invocation at a time, bounded by an optional timeout and an optional
//! absolute deadline, and is relaunched after every completion when
//! `restart_always` is set. Failures go to a single error callback. The
//! supervisor exposes aggregate health and a graceful stop, and can serve both
//! over HTTP.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Worker    │   │    Worker    │   │    Worker    │
//!     │ name/handler │   │ name/handler │   │ name/handler │
//!     │   + config   │   │   + config   │   │   + config   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - root CancellationToken (graceful stop)                         │
//! │  - HealthAggregator (worker probes AND external predicates)       │
//! │  - ErrorHandler (optional)                                        │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ WorkerEngine │   │ WorkerEngine │   │ WorkerEngine │
//!     │ slot × N     │   │ slot × N     │   │ slot × N     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ FailureRecord    │                  │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │            FailureSink (bounded mpsc, failure_buffer)             │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                          Dispatcher ──► on_error(worker, error)
//! ```
//!
//! ### Slot lifecycle
//! ```text
//! loop {
//!   ├─► status = Started
//!   ├─► run_once(handler, child token, cutoff = min(start + timeout, deadline))
//!   │       ├─ Ok  ──► status = Finished
//!   │       └─ Err ──► status = Errored, deliver FailureRecord
//!   └─► exit unless restart_always and the supervisor is not stopping
//! }
//! ```
//!
//! ## Features
//! | Area            | Description                                                | Key types / traits                        |
//! |-----------------|------------------------------------------------------------|-------------------------------------------|
//! | **Workers**     | Define handlers as trait objects or closures.              | [`Handler`], [`HandlerFn`], [`Worker`]    |
//! | **Execution**   | Slots, timeout, deadline, restart.                         | [`WorkerConfig`], [`Status`]              |
//! | **Supervision** | Run, stop, aggregate health, introspection.                | [`Supervisor`], [`run_all`]               |
//! | **Errors**      | Typed errors for runtime, configuration and handlers.      | [`RuntimeError`], [`ConfigError`], [`WorkerError`] |
//! | **Config**      | Serde-friendly supervisor and monitor settings.            | [`SupervisorConfig`], [`MonitorConfig`]   |
//!
//! ## Optional features
//! - `monitor` (default): `GET <base>/health-check` and `GET <base>/stats` over axum.
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
//!             "hello",
//!             |ctx: CancellationToken| async move {
//!                 if ctx.is_cancelled() {
//!                     return Err(WorkerError::Canceled);
//!                 }
//!                 println!("Hello from worker!");
//!                 Ok(())
//!             },
//!             WorkerConfig::default().with_timeout(Duration::from_secs(5)),
//!         )?
//!         .handle_error(|worker, err| eprintln!("{}: {err}", worker.name()))
//!         .build()?;
//!
//!     sup.run().await?;
//!     assert!(!sup.healthy());
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod workers;

// ---- Public re-exports ----

pub use core::{
    ErrorHandler, HealthAggregator, HealthCheck, MonitorConfig, Supervisor,
    SupervisorBuilder, SupervisorConfig, SupervisorInfo, WorkerInfo, run_all,
};
pub use error::{ConfigError, RuntimeError, WorkerError};
pub use workers::{Handler, HandlerFn, HandlerRef, Status, StatusTable, Worker, WorkerConfig};

// HTTP health-check and stats endpoints.
// Disable with: `--no-default-features`
#[cfg(feature = "monitor")]
pub mod monitor;
