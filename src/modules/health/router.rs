use axum::{Router, middleware, routing::get};

use super::controller::{health_check, metrics_handler};
use crate::middleware::auth::require_basic;
use crate::state::AppState;

/// Operator endpoints, all behind basic auth.
pub fn init_health_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/debug/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn_with_state(state, require_basic))
}
