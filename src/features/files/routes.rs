use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::files::handlers;
use crate::features::files::services::FileService;

/// Routes for the files feature
pub fn routes(service: Arc<FileService>) -> Router {
    Router::new()
        .route("/api/files", get(handlers::list_files))
        .route(
            "/api/files/{id}",
            get(handlers::get_file).delete(handlers::delete_file),
        )
        .route("/api/files/{id}/download", get(handlers::download_file))
        .with_state(service)
}
