use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::{self, Operation, Resource};
use crate::features::documents::dtos::{
    CreateDocumentDto, DocumentDeletedDto, DocumentFilesDto, DocumentFilterQuery,
    DocumentResponseDto, ExportMultipleQuery, FilesAddedDto, UpdateDocumentDto, UpdateStatusDto,
    UploadedFile,
};
use crate::features::documents::models::Etat;
use crate::features::documents::services::DocumentService;
use crate::shared::http::attachment_response;
use crate::shared::types::{Paginated, PaginationQuery};

/// List documents (defaults to active ones)
#[utoipa::path(
    get,
    path = "/api/documents",
    params(DocumentFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Paginated documents", body = Paginated<DocumentResponseDto>)
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn list_documents(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Query(filter): Query<DocumentFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Paginated<DocumentResponseDto>>> {
    policy::authorize(&user, Resource::Document, Operation::Read)?;
    let (documents, total) = service.list(&user, &filter, &pagination).await?;
    Ok(Json(Paginated::new(documents, total, &pagination)))
}

/// Create a document, files included, from one multipart form
///
/// Fields: `title`, `content`, `category_id`, plus any number of `files`
/// parts.
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body(content = CreateDocumentDto, content_type = "multipart/form-data", description = "title, content, category_id and repeated `files` parts"),
    responses(
        (status = 201, description = "Document created", body = DocumentResponseDto),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn create_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentResponseDto>)> {
    policy::authorize(&user, Resource::Document, Operation::Create)?;

    let (fields, uploads) = read_multipart_form(&mut multipart).await?;
    let dto = CreateDocumentDto {
        title: fields.get("title").cloned().unwrap_or_default(),
        content: fields.get("content").cloned().unwrap_or_default(),
        category_id: fields
            .get("category_id")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0),
    };
    dto.validate()?;

    let document = service.create(&user, dto, uploads).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Show a document with its relations (inactive ones stay reachable)
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document", body = DocumentResponseDto),
        (status = 404, description = "Document not found")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn get_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<i64>,
) -> Result<Json<DocumentResponseDto>> {
    policy::authorize(&user, Resource::Document, Operation::Read)?;
    let document = service.get(&user, id).await?;
    Ok(Json(document))
}

/// Update a document's title, content or category
#[utoipa::path(
    patch,
    path = "/api/documents/{id}",
    params(("id" = i64, Path, description = "Document id")),
    request_body = UpdateDocumentDto,
    responses(
        (status = 200, description = "Document updated", body = DocumentResponseDto),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn update_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateDocumentDto>,
) -> Result<Json<DocumentResponseDto>> {
    policy::authorize(&user, Resource::Document, Operation::Update)?;
    dto.validate()?;
    let document = service.update(&user, id, dto).await?;
    Ok(Json(document))
}

/// Logical delete: flips the document to inactive, nothing is removed
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document deactivated", body = DocumentDeletedDto),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 404, description = "Document not found")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn delete_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<i64>,
) -> Result<Json<DocumentDeletedDto>> {
    policy::authorize(&user, Resource::Document, Operation::Delete)?;
    let result = service.destroy(&user, id).await?;
    Ok(Json(result))
}

/// Explicit status transition (actif/inactif)
#[utoipa::path(
    patch,
    path = "/api/documents/{id}/status",
    params(("id" = i64, Path, description = "Document id")),
    request_body = UpdateStatusDto,
    responses(
        (status = 200, description = "Status updated", body = DocumentResponseDto),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Unknown status")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn update_document_status(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateStatusDto>,
) -> Result<Json<DocumentResponseDto>> {
    policy::authorize(&user, Resource::Document, Operation::Update)?;
    dto.validate()?;
    let etat = Etat::parse(&dto.etat)
        .ok_or_else(|| AppError::field_error("etat", "L'état doit être actif ou inactif"))?;
    let document = service.update_status(&user, id, etat).await?;
    Ok(Json(document))
}

/// Reactivate a deactivated document
#[utoipa::path(
    patch,
    path = "/api/documents/{id}/restore",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document reactivated", body = DocumentResponseDto),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 404, description = "Document not found")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn restore_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<i64>,
) -> Result<Json<DocumentResponseDto>> {
    policy::authorize(&user, Resource::Document, Operation::Update)?;
    let document = service.update_status(&user, id, Etat::Actif).await?;
    Ok(Json(document))
}

/// Export one document as a zip (files + manifest)
#[utoipa::path(
    get,
    path = "/api/documents/{id}/export",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "Zip archive", body = Vec<u8>, content_type = "application/zip"),
        (status = 404, description = "Document not found")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn export_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<i64>,
) -> Result<Response> {
    policy::authorize(&user, Resource::Document, Operation::Read)?;
    let (filename, bytes) = service.export(&user, id).await?;
    Ok(attachment_response(&filename, "application/zip", bytes))
}

/// Export several documents in one zip, one subfolder per document
#[utoipa::path(
    get,
    path = "/api/documents/export-multiple",
    params(ExportMultipleQuery),
    responses(
        (status = 200, description = "Zip archive", body = Vec<u8>, content_type = "application/zip"),
        (status = 404, description = "No exportable document"),
        (status = 422, description = "No valid id supplied")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn export_multiple_documents(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Query(query): Query<ExportMultipleQuery>,
) -> Result<Response> {
    policy::authorize(&user, Resource::Document, Operation::Read)?;

    let ids: Vec<i64> = query
        .ids
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect();
    if ids.is_empty() {
        return Err(AppError::field_error(
            "ids",
            "Aucun identifiant de document valide",
        ));
    }

    let (filename, bytes) = service.export_multiple(&user, &ids).await?;
    Ok(attachment_response(&filename, "application/zip", bytes))
}

/// Add files to an existing document (multipart `files` parts)
#[utoipa::path(
    post,
    path = "/api/documents/{id}/files",
    params(("id" = i64, Path, description = "Document id")),
    request_body(content = String, content_type = "multipart/form-data", description = "Repeated `files` parts"),
    responses(
        (status = 201, description = "Files added", body = FilesAddedDto),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn add_document_files(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<FilesAddedDto>)> {
    policy::authorize(&user, Resource::File, Operation::Create)?;

    let (_, uploads) = read_multipart_form(&mut multipart).await?;
    let result = service.add_files(&user, id, uploads).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// List a document's files with their on-disk status
#[utoipa::path(
    get,
    path = "/api/documents/{id}/files",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "Files of the document", body = DocumentFilesDto),
        (status = 404, description = "Document not found")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn list_document_files(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<i64>,
) -> Result<Json<DocumentFilesDto>> {
    policy::authorize(&user, Resource::File, Operation::Read)?;
    let files = service.list_files(&user, id).await?;
    Ok(Json(files))
}

/// Download one of a document's files
#[utoipa::path(
    get,
    path = "/api/documents/{id}/files/{file_id}/download",
    params(
        ("id" = i64, Path, description = "Document id"),
        ("file_id" = i64, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File content", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Document or file not found")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn download_document_file(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path((id, file_id)): Path<(i64, i64)>,
) -> Result<Response> {
    policy::authorize(&user, Resource::File, Operation::Read)?;
    let (file, bytes) = service.download_file(&user, id, file_id).await?;
    Ok(attachment_response(
        &file.original_name,
        &file.mime_type,
        bytes,
    ))
}

/// Decode a multipart body into text fields and uploaded files. Any part
/// named `files` (also `files[]` / `files.N`) is treated as a file.
async fn read_multipart_form(
    multipart: &mut Multipart,
) -> Result<(BTreeMap<String, String>, Vec<UploadedFile>)> {
    let mut fields = BTreeMap::new();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Lecture du formulaire multipart impossible: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "files" || name.starts_with("files[") || name.starts_with("files.") {
            let original_name = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "fichier".to_string());
            let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_else(|| {
                mime_guess::from_path(&original_name)
                    .first_or_octet_stream()
                    .to_string()
            });
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Lecture du fichier impossible: {}", e)))?
                .to_vec();

            uploads.push(UploadedFile {
                original_name,
                content_type,
                data,
            });
        } else {
            let value = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Lecture du champ {} impossible: {}", name, e))
            })?;
            fields.insert(name, value);
        }
    }

    Ok((fields, uploads))
}
