//! # Introspection snapshots.
//!
//! Plain serializable views of the supervisor and its workers, rendered by the
//! `stats` endpoint and available to any caller through
//! [`Supervisor::infos`](crate::Supervisor::infos).

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use uuid::Uuid;

use crate::core::config::MonitorConfig;
use crate::workers::{Status, Worker};

/// Snapshot of one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerInfo {
    pub id: Uuid,
    pub name: String,
    pub concurrency: usize,
    pub restart_always: bool,
    /// Per-invocation timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Deadline as milliseconds since the Unix epoch.
    pub deadline_ms: Option<u64>,
    pub status: Vec<Status>,
    pub is_up: bool,
}

impl From<&Worker> for WorkerInfo {
    fn from(w: &Worker) -> Self {
        let cfg = w.config();
        Self {
            id: w.id(),
            name: w.name().to_string(),
            concurrency: cfg.concurrency(),
            restart_always: cfg.restart_always(),
            timeout_ms: cfg.timeout().map(|d| saturating_ms(d.as_millis())),
            deadline_ms: cfg.deadline().map(epoch_ms),
            status: w.status(),
            is_up: w.is_up(),
        }
    }
}

/// Snapshot of the whole supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupervisorInfo {
    /// Aggregate health at snapshot time.
    pub healthy: bool,
    pub workers: Vec<WorkerInfo>,
    pub monitor: MonitorConfig,
}

fn saturating_ms(ms: u128) -> u64 {
    ms.min(u128::from(u64::MAX)) as u64
}

fn epoch_ms(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| saturating_ms(d.as_millis()))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::workers::{HandlerFn, WorkerConfig};

    #[test]
    fn worker_info_reflects_config() {
        let cfg = WorkerConfig::default()
            .with_concurrency(2)
            .with_timeout(Duration::from_millis(1500))
            .with_deadline(UNIX_EPOCH + Duration::from_secs(10));
        let h = HandlerFn::arc(|_ctx: CancellationToken| async { Ok(()) });
        let w = Worker::new("stats", h, cfg).unwrap();

        let info = WorkerInfo::from(&w);
        assert_eq!(info.name, "stats");
        assert_eq!(info.concurrency, 2);
        assert_eq!(info.timeout_ms, Some(1500));
        assert_eq!(info.deadline_ms, Some(10_000));
        assert!(info.status.is_empty());
        assert!(!info.is_up);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["restart_always"], false);
        assert_eq!(json["status"], serde_json::json!([]));
    }
}
