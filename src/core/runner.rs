//! # Run a single handler invocation.
//!
//! Executes one invocation of a worker's [`Handler`](crate::Handler) under a per-invocation
//! child token whose cutoff comes from the worker's timeout and deadline.
//!
//! ## Cutoff
//! ```text
//! timeout  deadline   cutoff
//! ───────  ────────   ─────────────────────────────────────
//! Some(t)  Some(d)    min(start + t, d)
//! Some(t)  None       start + t
//! None     Some(d)    d
//! None     None       none (parent token only)
//! ```
//!
//! ## Rules
//! - Cancellation is **cooperative**: reaching the cutoff cancels the child token,
//!   then keeps waiting for the handler to return on its own.
//! - Reaching the cutoff is **not** a failure by itself; the result is whatever the
//!   handler returns.
//! - A panic inside the handler is caught and returned as [`WorkerError::Panicked`].
//! - The child token is cancelled when the invocation ends; the parent is never touched.

use std::panic::AssertUnwindSafe;
use std::time::{Duration, SystemTime};

use futures::FutureExt;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::WorkerError;
use crate::workers::{Worker, WorkerConfig};

/// Computes the cutoff of an invocation starting at `start` (monotonic clock)
/// while the wall clock reads `wall_now`.
///
/// A deadline already in the past yields `start`. Instants too far in the
/// future to be represented are treated as "no cutoff".
pub(crate) fn cutoff(config: &WorkerConfig, start: Instant, wall_now: SystemTime) -> Option<Instant> {
    let by_timeout = config.timeout().and_then(|t| start.checked_add(t));
    let by_deadline = config.deadline().and_then(|d| {
        let remaining = d.duration_since(wall_now).unwrap_or(Duration::ZERO);
        start.checked_add(remaining)
    });

    match (by_timeout, by_deadline) {
        (Some(t), Some(d)) => Some(t.min(d)),
        (t, d) => t.or(d),
    }
}

/// Executes one invocation of `worker`'s handler for `slot`.
///
/// ### Flow
/// 1. Derive a child token from `parent`
/// 2. Start the handler, racing it against the cutoff (if any)
/// 3. On cutoff: cancel the child token and keep awaiting the handler
/// 4. Return the handler result (panics mapped to [`WorkerError::Panicked`])
pub(crate) async fn run_once(
    worker: &Worker,
    parent: &CancellationToken,
    slot: usize,
) -> Result<(), WorkerError> {
    let child = parent.child_token();
    let _guard = child.clone().drop_guard();

    let invocation = AssertUnwindSafe(worker.handler().handle(child.clone())).catch_unwind();
    tokio::pin!(invocation);

    let res = match cutoff(worker.config(), Instant::now(), SystemTime::now()) {
        Some(at) => {
            tokio::select! {
                biased;
                res = &mut invocation => res,
                _ = time::sleep_until(at) => {
                    debug!(worker = worker.name(), slot, "cutoff reached, cancelling invocation");
                    child.cancel();
                    invocation.await
                }
            }
        }
        None => invocation.await,
    };

    res.unwrap_or_else(|payload| Err(WorkerError::from_panic(payload)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::workers::{HandlerFn, HandlerRef};

    fn worker(cfg: WorkerConfig, handler: HandlerRef) -> Worker {
        Worker::new("runner-test", handler, cfg).unwrap()
    }

    #[test]
    fn cutoff_is_the_earlier_bound() {
        let start = Instant::now();
        let now = SystemTime::now();

        let cfg = WorkerConfig::default()
            .with_timeout(Duration::from_secs(2))
            .with_deadline(now + Duration::from_secs(4));
        assert_eq!(cutoff(&cfg, start, now), Some(start + Duration::from_secs(2)));

        let cfg = WorkerConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_deadline(now + Duration::from_secs(1));
        assert_eq!(cutoff(&cfg, start, now), Some(start + Duration::from_secs(1)));
    }

    #[test]
    fn cutoff_with_a_single_bound() {
        let start = Instant::now();
        let now = SystemTime::now();

        let cfg = WorkerConfig::default().with_timeout(Duration::from_millis(300));
        assert_eq!(cutoff(&cfg, start, now), Some(start + Duration::from_millis(300)));

        let cfg = WorkerConfig::default().with_deadline(now + Duration::from_secs(3));
        assert_eq!(cutoff(&cfg, start, now), Some(start + Duration::from_secs(3)));

        assert_eq!(cutoff(&WorkerConfig::default(), start, now), None);
    }

    #[test]
    fn past_deadline_cuts_off_immediately() {
        let start = Instant::now();
        let now = SystemTime::now();
        let cfg = WorkerConfig::default().with_deadline(now - Duration::from_secs(10));
        assert_eq!(cutoff(&cfg, start, now), Some(start));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_cancels_the_child_token_only() {
        let w = worker(
            WorkerConfig::default().with_timeout(Duration::from_secs(2)),
            HandlerFn::arc(|ctx: CancellationToken| async move {
                ctx.cancelled().await;
                Err(WorkerError::Canceled)
            }),
        );
        let parent = CancellationToken::new();

        let started = Instant::now();
        let res = run_once(&w, &parent, 0).await;
        assert_eq!(res, Err(WorkerError::Canceled));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_millis(2100));
        assert!(!parent.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn handler_ignoring_the_token_runs_past_the_cutoff() {
        let w = worker(
            WorkerConfig::default().with_timeout(Duration::from_secs(1)),
            HandlerFn::arc(|_ctx: CancellationToken| async move {
                time::sleep(Duration::from_secs(5)).await;
                Ok(())
            }),
        );

        let started = Instant::now();
        let res = run_once(&w, &CancellationToken::new(), 0).await;
        assert_eq!(res, Ok(()));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_millis(5100));
    }

    fn explode() -> Result<(), WorkerError> {
        panic!("handler blew up")
    }

    #[tokio::test]
    async fn panics_become_failures() {
        let w = worker(
            WorkerConfig::default(),
            HandlerFn::arc(|_ctx: CancellationToken| async move { explode() }),
        );

        let res = run_once(&w, &CancellationToken::new(), 0).await;
        assert_eq!(
            res,
            Err(WorkerError::Panicked {
                info: "handler blew up".into()
            })
        );
    }

    #[tokio::test]
    async fn child_token_is_released_after_the_invocation() {
        let seen: Arc<std::sync::Mutex<Option<CancellationToken>>> = Arc::default();
        let slot = Arc::clone(&seen);
        let w = worker(
            WorkerConfig::default(),
            HandlerFn::arc(move |ctx: CancellationToken| {
                let slot = Arc::clone(&slot);
                async move {
                    *slot.lock().unwrap() = Some(ctx);
                    Ok(())
                }
            }),
        );

        run_once(&w, &CancellationToken::new(), 0).await.unwrap();
        let ctx = seen.lock().unwrap().take().unwrap();
        assert!(ctx.is_cancelled());
    }
}
