use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::{self, Operation, Resource};
use crate::features::files::dtos::{FileFilterQuery, FileResponseDto, FileWithDocumentDto};
use crate::features::files::services::FileService;
use crate::shared::http::attachment_response;
use crate::shared::types::{MessageResponse, Paginated, PaginationQuery};

/// List files across the archive
#[utoipa::path(
    get,
    path = "/api/files",
    params(FileFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Paginated files", body = Paginated<FileResponseDto>)
    ),
    security(("bearer_auth" = [])),
    tag = "files"
)]
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Query(filter): Query<FileFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Paginated<FileResponseDto>>> {
    policy::authorize(&user, Resource::File, Operation::Read)?;
    let (files, total) = service.list(&user, &filter, &pagination).await?;
    Ok(Json(Paginated::new(files, total, &pagination)))
}

/// Show a file with its owning document
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    params(("id" = i64, Path, description = "File id")),
    responses(
        (status = 200, description = "File", body = FileWithDocumentDto),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = [])),
    tag = "files"
)]
pub async fn get_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<i64>,
) -> Result<Json<FileWithDocumentDto>> {
    policy::authorize(&user, Resource::File, Operation::Read)?;
    let file = service.get(&user, id).await?;
    Ok(Json(file))
}

/// Download a file under its original name
#[utoipa::path(
    get,
    path = "/api/files/{id}/download",
    params(("id" = i64, Path, description = "File id")),
    responses(
        (status = 200, description = "File content", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "File missing from storage")
    ),
    security(("bearer_auth" = [])),
    tag = "files"
)]
pub async fn download_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<i64>,
) -> Result<Response> {
    policy::authorize(&user, Resource::File, Operation::Read)?;
    let (file, bytes) = service.download(&user, id).await?;
    Ok(attachment_response(
        &file.original_name,
        &file.mime_type,
        bytes,
    ))
}

/// Delete a file: database row and physical file together
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    params(("id" = i64, Path, description = "File id")),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = [])),
    tag = "files"
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    policy::authorize(&user, Resource::File, Operation::Delete)?;
    service.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("Fichier supprimé avec succès")))
}
