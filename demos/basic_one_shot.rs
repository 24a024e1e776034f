//! # Example: basic_one_shot
//!
//! A single one-shot worker with two slots, a timeout and an error callback.
//!
//! ## Flow
//! ```text
//! Supervisor::run()
//!     └─► run_all()
//!           └─► WorkerEngine::run()   (2 slots)
//!                 ├─► slot 0: run_once() ──► Finished
//!                 └─► slot 1: run_once() ──► cutoff at 1s ──► Errored ──► on_error
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=workvisor=debug cargo run --example basic_one_shot
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use workvisor::{Supervisor, SupervisorConfig, WorkerConfig, WorkerError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // Slot 0 works for 300ms; slot 1 would take 3s but is cut off at 1s.
    let next = Arc::new(AtomicUsize::new(0));
    let hello = move |ctx: CancellationToken| {
        let nth = next.fetch_add(1, Ordering::SeqCst);
        async move {
            let work = Duration::from_millis(if nth == 0 { 300 } else { 3_000 });
            println!("[hello #{nth}] started (work {work:?})");
            tokio::select! {
                _ = ctx.cancelled() => {
                    println!("[hello #{nth}] cut off");
                    Err(WorkerError::Canceled)
                }
                _ = tokio::time::sleep(work) => {
                    println!("[hello #{nth}] done");
                    Ok(())
                }
            }
        }
    };

    let sup = Supervisor::builder(SupervisorConfig::default())
        .worker_fn(
            "hello",
            hello,
            WorkerConfig::default()
                .with_concurrency(2)
                .with_timeout(Duration::from_secs(1)),
        )?
        .handle_error(|worker, err| println!("[on_error] {}: {err}", worker.name()))
        .build()?;

    sup.run().await?;
    println!("final status: {:?}", sup.workers()[0].status());
    Ok(())
}
