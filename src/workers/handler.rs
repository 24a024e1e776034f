//! # Handler abstraction.
//!
//! This module defines the [`Handler`] trait (async, cancelable). The common handle
//! type is [`HandlerRef`], an `Arc<dyn Handler>` shared by every slot of a worker.
//!
//! A handler receives a [`CancellationToken`] and should periodically check it to
//! stop cooperatively. Nothing stops a handler that ignores it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;

/// # Asynchronous, cancelable unit of work.
///
/// One call to [`handle`](Handler::handle) is one invocation of a slot. Slots of the
/// same worker call it concurrently, so any shared state must be synchronized by
/// the implementor.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use workvisor::{Handler, WorkerError};
///
/// struct Poller;
///
/// #[async_trait]
/// impl Handler for Poller {
///     async fn handle(&self, ctx: CancellationToken) -> Result<(), WorkerError> {
///         if ctx.is_cancelled() {
///             return Err(WorkerError::Canceled);
///         }
///         // poll something...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Runs one invocation until completion or cancellation.
    ///
    /// `ctx` is cancelled when the run is stopped or when the worker's timeout or
    /// deadline is reached.
    async fn handle(&self, ctx: CancellationToken) -> Result<(), WorkerError>;
}

/// Shared handler reference.
pub type HandlerRef = Arc<dyn Handler>;
