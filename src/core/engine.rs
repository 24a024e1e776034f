//! # WorkerEngine: runs one worker across its slots.
//!
//! Launches `concurrency` independent slots for a [`Worker`], each repeatedly
//! invoking the handler according to the restart policy, and returns once every
//! slot has exited for good.
//!
//! ## Slot loop
//! ```text
//! loop {
//!   ├─► cell = Started
//!   ├─► run_once(handler, parent, cutoff)
//!   │       ├─ Ok  ──► cell = Finished
//!   │       └─ Err ──► cell = Errored ──► sink.deliver(FailureRecord)   (may wait)
//!   │
//!   └─► exit if !restart_always
//!       yield to the scheduler
//!       exit if parent cancelled
//!       otherwise relaunch immediately
//! }
//! ```
//!
//! ## Rules
//! - Slots never touch each other's cells.
//! - Cancellation is only observed at completion boundaries; a slot whose
//!   handler ignores its token stays `Started` until the handler returns.
//! - A slot that exits keeps its last terminal state.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::dispatcher::{FailureRecord, FailureSink};
use crate::core::runner::run_once;
use crate::workers::{Status, Worker};

/// Supervises every slot of a single [`Worker`].
pub(crate) struct WorkerEngine {
    worker: Arc<Worker>,
    sink: FailureSink,
}

impl WorkerEngine {
    pub(crate) fn new(worker: Arc<Worker>, sink: FailureSink) -> Self {
        Self { worker, sink }
    }

    /// Runs every slot until each one has permanently exited.
    ///
    /// The status table is populated (all `Started`) before this future first
    /// yields. A worker can only be started once; a second call returns at once.
    pub(crate) async fn run(self, parent: CancellationToken) {
        let worker = self.worker;
        let slots = worker.config().concurrency();

        if !worker.status_table().launch(slots) {
            warn!(worker = worker.name(), id = %worker.id(), "worker already started, ignoring");
            return;
        }
        info!(
            worker = worker.name(),
            id = %worker.id(),
            concurrency = slots,
            restart_always = worker.config().restart_always(),
            "worker started"
        );

        let mut set = JoinSet::new();
        for slot in 0..slots {
            set.spawn(run_slot(
                Arc::clone(&worker),
                slot,
                parent.clone(),
                self.sink.clone(),
            ));
        }
        drop(self.sink);

        while let Some(res) = set.join_next().await {
            if let Err(e) = res {
                error!(worker = worker.name(), error = %e, "slot task aborted");
            }
        }
        info!(worker = worker.name(), id = %worker.id(), status = ?worker.status(), "worker stopped");
    }
}

/// Runs one slot until its restart policy or the parent token ends it.
async fn run_slot(worker: Arc<Worker>, slot: usize, parent: CancellationToken, sink: FailureSink) {
    let table = worker.status_table();
    let restart_always = worker.config().restart_always();

    loop {
        table.set(slot, Status::Started);
        debug!(worker = worker.name(), slot, "slot started");

        match run_once(&worker, &parent, slot).await {
            Ok(()) => {
                table.set(slot, Status::Finished);
                debug!(worker = worker.name(), slot, "slot finished");
            }
            Err(e) => {
                table.set(slot, Status::Errored);
                warn!(worker = worker.name(), slot, error = %e, label = e.as_label(), "slot failed");
                sink.deliver(FailureRecord::new(Arc::clone(&worker), e))
                    .await;
            }
        }

        if !restart_always {
            break;
        }
        // A handler that is ready on first poll never returns to the scheduler.
        tokio::task::yield_now().await;
        if parent.is_cancelled() {
            break;
        }
    }
}
