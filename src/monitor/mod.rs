//! # HTTP monitoring endpoints.
//!
//! Renders values the core already exposes; it holds an explicit
//! `Arc<Supervisor>` handle and never reaches into the engines.
//!
//! | route                        | response                                   |
//! |------------------------------|--------------------------------------------|
//! | `GET <base>/health-check`    | `200 {"status": <bool>}`                   |
//! | `GET <base>/stats`           | `200` [`SupervisorInfo`](crate::SupervisorInfo) as JSON |
//! | any other method on those    | `405 Method Not Allowed`                   |
//!
//! Each route is mounted only when enabled in [`MonitorConfig`](crate::MonitorConfig).
//! Either handler can be replaced through the
//! [`SupervisorBuilder`](crate::SupervisorBuilder).

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{Supervisor, error::RuntimeError};

pub use routes::router;
pub(crate) use routes::RouteOverrides;

/// Running monitor server.
#[derive(Debug)]
pub struct MonitorHandle {
    addr: SocketAddr,
    token: CancellationToken,
    join: JoinHandle<std::io::Result<()>>,
}

impl MonitorHandle {
    /// Address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(self) -> Result<(), RuntimeError> {
        self.token.cancel();
        match self.join.await {
            Ok(res) => res.map_err(RuntimeError::Monitor),
            Err(e) => {
                error!(error = %e, "monitor task aborted");
                Ok(())
            }
        }
    }
}

/// Binds the configured address and serves the monitor router.
///
/// Returns `Ok(None)` when every endpoint is disabled.
pub async fn start(sup: Arc<Supervisor>) -> Result<Option<MonitorHandle>, RuntimeError> {
    let cfg = &sup.config().monitor;
    if !cfg.enabled() {
        return Ok(None);
    }

    let addr = cfg.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| RuntimeError::bind(&addr, e))?;
    serve(listener, router(sup)).map(Some)
}

/// Serves `app` on `listener` until the returned handle is shut down.
pub fn serve(listener: TcpListener, app: axum::Router) -> Result<MonitorHandle, RuntimeError> {
    let addr = listener.local_addr().map_err(RuntimeError::Monitor)?;
    let token = CancellationToken::new();
    let stop = token.clone();

    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { stop.cancelled().await })
            .await
    });
    info!(%addr, "monitor listening");

    Ok(MonitorHandle { addr, token, join })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::*;
    use crate::{SupervisorConfig, WorkerConfig};

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(req.as_bytes()).await.unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn serves_health_check_over_tcp() {
        let mut cfg = SupervisorConfig::default();
        cfg.monitor.health_check = true;
        let sup = Supervisor::builder(cfg)
            .check_health(|| true)
            .build()
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let handle = serve(listener, router(sup)).unwrap();

        let resp = tokio::time::timeout(
            Duration::from_secs(5),
            get(handle.local_addr(), "/workers/health-check"),
        )
        .await
        .unwrap();
        assert!(resp.starts_with("HTTP/1.1 200"), "{resp}");
        assert!(resp.ends_with(r#"{"status":true}"#), "{resp}");

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn disabled_monitor_does_not_bind() {
        let sup = Supervisor::builder(SupervisorConfig::default())
            .worker_fn(
                "w",
                |_ctx: CancellationToken| async { Ok(()) },
                WorkerConfig::default(),
            )
            .unwrap()
            .build()
            .unwrap();
        assert!(start(sup).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut cfg = SupervisorConfig::default();
        cfg.monitor.host = "127.0.0.1".into();
        cfg.monitor.port = taken.local_addr().unwrap().port();
        cfg.monitor.stats = true;
        let sup = Supervisor::builder(cfg).build().unwrap();

        let err = start(sup).await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_monitor_bind");
    }

    #[tokio::test]
    async fn run_can_be_retried_after_bind_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut cfg = SupervisorConfig::default();
        cfg.monitor.host = "127.0.0.1".into();
        cfg.monitor.port = taken.local_addr().unwrap().port();
        cfg.monitor.health_check = true;
        let sup = Supervisor::builder(cfg).build().unwrap();

        let err = sup.run().await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_monitor_bind");

        drop(taken);
        sup.run().await.unwrap();
        assert!(matches!(
            sup.run().await.unwrap_err(),
            RuntimeError::AlreadyRunning
        ));
    }
}
