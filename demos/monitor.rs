//! # Example: monitor
//!
//! Serves the health-check and stats endpoints while two workers run. The
//! health-check handler is replaced by one answering `503` when unhealthy.
//!
//! ```bash
//! cargo run --example monitor
//! curl http://localhost:8001/workers/health-check
//! curl http://localhost:8001/workers/stats
//! ```
//!
//! Stop with Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode, routing::get};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use workvisor::{MonitorConfig, Supervisor, SupervisorConfig, WorkerConfig, WorkerError};

async fn tick(ctx: CancellationToken, every: Duration) -> Result<(), WorkerError> {
    tokio::select! {
        _ = ctx.cancelled() => Err(WorkerError::Canceled),
        _ = tokio::time::sleep(every) => Ok(()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cfg = SupervisorConfig {
        handle_signals: true,
        monitor: MonitorConfig {
            stats: true,
            health_check: true,
            ..MonitorConfig::default()
        },
        ..SupervisorConfig::default()
    };

    let sup = Supervisor::builder(cfg)
        .worker_fn(
            "heartbeat",
            |ctx| tick(ctx, Duration::from_secs(1)),
            WorkerConfig::default().with_restart_always(true),
        )?
        .worker_fn(
            "indexer",
            |ctx| tick(ctx, Duration::from_secs(5)),
            WorkerConfig::default()
                .with_concurrency(3)
                .with_timeout(Duration::from_secs(2))
                .with_restart_always(true),
        )?
        .check_health(|| true)
        .health_check_route(get(|State(sup): State<Arc<Supervisor>>| async move {
            let healthy = sup.healthy();
            let code = if healthy {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            (code, Json(json!({ "status": healthy })))
        }))
        .build()?;

    sup.run().await?;
    Ok(())
}
