use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::logs::handlers;
use crate::features::logs::services::LogService;

/// Routes for the activity trail (viewing is admin-only, enforced by the
/// access policy in the handlers)
pub fn routes(service: Arc<LogService>) -> Router {
    Router::new()
        .route("/api/logs", get(handlers::list_logs))
        .route("/api/logs/{id}", get(handlers::get_log))
        .with_state(service)
}
