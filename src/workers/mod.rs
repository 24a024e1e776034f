//! # Worker abstractions.
//!
//! - [`Handler`] - trait for async cancelable units of work
//! - [`HandlerFn`] - closure-backed handler
//! - [`WorkerConfig`] - concurrency / timeout / deadline / restart settings
//! - [`Worker`] - registered worker with identity and live slot states
//! - [`Status`], [`StatusTable`] - per-slot execution state

mod config;
mod handler;
mod handler_fn;
mod status;
mod worker;

pub use config::WorkerConfig;
pub use handler::{Handler, HandlerRef};
pub use handler_fn::HandlerFn;
pub use status::{Status, StatusTable};
pub use worker::Worker;
