use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{MethodRouter, get},
};
use serde_json::{Value, json};

use crate::{Supervisor, SupervisorInfo};

/// Caller-provided replacements for the built-in endpoint handlers.
#[derive(Clone, Default)]
pub(crate) struct RouteOverrides {
    pub(crate) stats: Option<MethodRouter<Arc<Supervisor>>>,
    pub(crate) health_check: Option<MethodRouter<Arc<Supervisor>>>,
}

/// Builds the monitor router, nested under the configured base path.
///
/// Handlers registered with
/// [`SupervisorBuilder::stats_route`](crate::SupervisorBuilder::stats_route) or
/// [`health_check_route`](crate::SupervisorBuilder::health_check_route) replace
/// the built-in ones; either way a route is mounted only when enabled.
pub fn router(sup: Arc<Supervisor>) -> Router {
    let cfg = &sup.config().monitor;
    let overrides = sup.route_overrides();

    let mut routes: Router<Arc<Supervisor>> = Router::new();
    if cfg.health_check {
        let route = overrides
            .health_check
            .clone()
            .unwrap_or_else(|| get(health_check));
        routes = routes.route("/health-check", route);
    }
    if cfg.stats {
        let route = overrides.stats.clone().unwrap_or_else(|| get(stats));
        routes = routes.route("/stats", route);
    }

    let base = cfg.base_path.clone();
    let routes = routes.with_state(sup);
    if base.is_empty() {
        routes
    } else {
        Router::new().nest(&base, routes)
    }
}

async fn health_check(State(sup): State<Arc<Supervisor>>) -> Json<Value> {
    Json(json!({ "status": sup.healthy() }))
}

async fn stats(State(sup): State<Arc<Supervisor>>) -> Json<SupervisorInfo> {
    Json(sup.infos())
}
