//! # Example: restart_always
//!
//! A worker relaunched after every completion, stopped gracefully on Ctrl-C or
//! after five seconds, whichever comes first.
//!
//! Every third run fails; the failure is reported and the slot relaunches.
//!
//! ## Run
//! ```bash
//! cargo run --example restart_always
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use workvisor::{Supervisor, SupervisorConfig, WorkerConfig, WorkerError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let runs = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&runs);

    let cfg = SupervisorConfig {
        handle_signals: true,
        failure_buffer: 8,
        ..SupervisorConfig::default()
    };

    let sup = Supervisor::builder(cfg)
        .worker_fn(
            "poller",
            move |ctx: CancellationToken| {
                let run = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    tokio::select! {
                        _ = ctx.cancelled() => return Err(WorkerError::Canceled),
                        _ = tokio::time::sleep(Duration::from_millis(400)) => {}
                    }
                    if run % 3 == 0 {
                        return Err(WorkerError::fail(format!("poll #{run} got a bad response")));
                    }
                    println!("[poller] poll #{run} ok");
                    Ok(())
                }
            },
            WorkerConfig::default()
                .with_concurrency(2)
                .with_restart_always(true),
        )?
        .handle_error(|worker, err| eprintln!("[on_error] {}: {}", worker.name(), err.as_message()))
        .build()?;

    let stopper = Arc::clone(&sup);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        stopper.stop();
    });

    sup.run().await?;
    println!("stopped after {} runs", runs.load(Ordering::SeqCst));
    Ok(())
}
