use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch},
    Router,
};

use crate::features::documents::handlers;
use crate::features::documents::services::DocumentService;

/// Create routes for the documents feature
pub fn routes(service: Arc<DocumentService>) -> Router {
    // Room for several files per request plus multipart overhead; the
    // per-file cap is enforced by the service
    let body_limit = DefaultBodyLimit::max(service.max_upload_size() * 10 + 1024 * 1024);

    Router::new()
        .route(
            "/api/documents",
            get(handlers::list_documents)
                .post(handlers::create_document)
                .layer(body_limit.clone()),
        )
        .route(
            "/api/documents/export-multiple",
            get(handlers::export_multiple_documents),
        )
        .route(
            "/api/documents/{id}",
            get(handlers::get_document)
                .patch(handlers::update_document)
                .delete(handlers::delete_document),
        )
        .route(
            "/api/documents/{id}/status",
            patch(handlers::update_document_status),
        )
        .route(
            "/api/documents/{id}/restore",
            patch(handlers::restore_document),
        )
        .route("/api/documents/{id}/export", get(handlers::export_document))
        .route(
            "/api/documents/{id}/files",
            get(handlers::list_document_files)
                .post(handlers::add_document_files)
                .layer(body_limit),
        )
        .route(
            "/api/documents/{id}/files/{file_id}/download",
            get(handlers::download_document_file),
        )
        .with_state(service)
}
