use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::audits::handlers;
use crate::features::audits::services::AuditService;

/// Routes for hearing records
pub fn routes(service: Arc<AuditService>) -> Router {
    Router::new()
        .route(
            "/api/audits",
            get(handlers::list_audits).post(handlers::create_audit),
        )
        .route(
            "/api/audits/{id}",
            get(handlers::get_audit)
                .patch(handlers::update_audit)
                .delete(handlers::delete_audit),
        )
        .with_state(service)
}
