//! # Failure sink and dispatcher.
//!
//! Every failing handler invocation produces one [`FailureRecord`]. Slots push
//! records into a shared bounded [`FailureSink`]; a single dispatcher task drains
//! it and calls the user's [`ErrorHandler`].
//!
//! ## Diagram
//! ```text
//!   slot w1#0 ──┐
//!   slot w1#1 ──┼──► FailureSink (mpsc, bounded) ──► Dispatcher ──► on_error(&Worker, &WorkerError)
//!   slot w2#0 ──┘
//! ```
//!
//! ## Rules
//! - `deliver` waits for capacity: a full sink throttles the failing slot.
//! - Records of one slot are dispatched in completion order; nothing is ordered
//!   across slots or workers.
//! - Without a callback, records are dropped after being received.
//! - A panicking callback is caught and logged; dispatching continues.
//! - The dispatcher exits once every sink clone is dropped and the queue is drained.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::error::WorkerError;
use crate::workers::Worker;

/// Callback invoked once per failing handler invocation.
pub type ErrorHandler = Arc<dyn Fn(&Worker, &WorkerError) + Send + Sync>;

/// A failing invocation: which worker, and what it returned.
#[derive(Debug)]
pub(crate) struct FailureRecord {
    worker: Arc<Worker>,
    error: WorkerError,
}

impl FailureRecord {
    pub(crate) fn new(worker: Arc<Worker>, error: WorkerError) -> Self {
        Self { worker, error }
    }
}

/// Producer side of the failure channel, cloned into every slot.
#[derive(Clone, Debug)]
pub(crate) struct FailureSink {
    tx: mpsc::Sender<FailureRecord>,
}

impl FailureSink {
    /// Delivers a record, waiting while the sink is full.
    pub(crate) async fn deliver(&self, record: FailureRecord) {
        if let Err(mpsc::error::SendError(record)) = self.tx.send(record).await {
            warn!(
                worker = record.worker.name(),
                error = %record.error,
                "failure dropped: dispatcher closed"
            );
        }
    }
}

/// Consumer side of the failure channel.
pub(crate) struct Dispatcher {
    rx: mpsc::Receiver<FailureRecord>,
    on_error: Option<ErrorHandler>,
}

/// Creates a sink with room for `capacity` records (min 1) and its dispatcher.
pub(crate) fn channel(capacity: usize, on_error: Option<ErrorHandler>) -> (FailureSink, Dispatcher) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (FailureSink { tx }, Dispatcher { rx, on_error })
}

impl Dispatcher {
    /// Drains the sink until every producer is gone.
    ///
    /// Returns the number of records received.
    pub(crate) async fn run(mut self) -> u64 {
        let mut received = 0u64;
        while let Some(record) = self.rx.recv().await {
            received += 1;
            self.dispatch(&record);
        }
        received
    }

    fn dispatch(&self, record: &FailureRecord) {
        let Some(on_error) = &self.on_error else {
            return;
        };
        let call = AssertUnwindSafe(|| on_error(&record.worker, &record.error));
        if let Err(panic) = catch_unwind(call) {
            let info = WorkerError::from_panic(panic);
            error!(
                worker = record.worker.name(),
                panic = %info,
                "error handler panicked"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::workers::{HandlerFn, WorkerConfig};

    fn worker(name: &str) -> Arc<Worker> {
        let h = HandlerFn::arc(|_ctx: CancellationToken| async { Ok(()) });
        Arc::new(Worker::new(name, h, WorkerConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn records_reach_the_callback_in_order() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink_seen = Arc::clone(&seen);
        let on_error: ErrorHandler = Arc::new(move |w: &Worker, e: &WorkerError| {
            sink_seen
                .lock()
                .unwrap()
                .push(format!("{}:{}", w.name(), e.as_message()));
        });

        let (sink, dispatcher) = channel(1, Some(on_error));
        let dispatch = tokio::spawn(dispatcher.run());

        let w = worker("w1");
        for i in 0..3 {
            sink.deliver(FailureRecord::new(Arc::clone(&w), WorkerError::fail(i)))
                .await;
        }
        drop(sink);

        assert_eq!(dispatch.await.unwrap(), 3);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["w1:error: 0", "w1:error: 1", "w1:error: 2"]
        );
    }

    #[tokio::test]
    async fn records_without_callback_are_drained() {
        let (sink, dispatcher) = channel(0, None);
        let dispatch = tokio::spawn(dispatcher.run());
        sink.deliver(FailureRecord::new(worker("w1"), WorkerError::Canceled))
            .await;
        drop(sink);
        assert_eq!(dispatch.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn panicking_callback_does_not_stop_dispatch() {
        let calls = Arc::new(Mutex::new(0u32));
        let counted = Arc::clone(&calls);
        let on_error: ErrorHandler = Arc::new(move |_w: &Worker, _e: &WorkerError| {
            let mut n = counted.lock().unwrap();
            *n += 1;
            if *n == 1 {
                drop(n);
                panic!("callback bug");
            }
        });

        let (sink, dispatcher) = channel(4, Some(on_error));
        let w = worker("w1");
        sink.deliver(FailureRecord::new(Arc::clone(&w), WorkerError::Canceled))
            .await;
        sink.deliver(FailureRecord::new(w, WorkerError::Canceled)).await;
        drop(sink);

        assert_eq!(dispatcher.run().await, 2);
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn full_sink_applies_backpressure() {
        let (sink, dispatcher) = channel(1, None);
        let w = worker("w1");
        sink.deliver(FailureRecord::new(Arc::clone(&w), WorkerError::Canceled))
            .await;

        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            sink.deliver(FailureRecord::new(Arc::clone(&w), WorkerError::Canceled)),
        )
        .await;
        assert!(blocked.is_err(), "second delivery should wait for capacity");

        let dispatch = tokio::spawn(dispatcher.run());
        sink.deliver(FailureRecord::new(w, WorkerError::Canceled)).await;
        drop(sink);
        assert_eq!(dispatch.await.unwrap(), 2);
    }
}
