use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::audits::dtos::{
    AuditFilterQuery, AuditResponseDto, CreateAuditDto, UpdateAuditDto,
};
use crate::features::audits::services::AuditService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::{self, Operation, Resource};
use crate::shared::types::{MessageResponse, Paginated, PaginationQuery};

/// List hearing records
#[utoipa::path(
    get,
    path = "/api/audits",
    params(AuditFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Paginated hearing records", body = Paginated<AuditResponseDto>)
    ),
    security(("bearer_auth" = [])),
    tag = "audits"
)]
pub async fn list_audits(
    user: AuthenticatedUser,
    State(service): State<Arc<AuditService>>,
    Query(filter): Query<AuditFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Paginated<AuditResponseDto>>> {
    policy::authorize(&user, Resource::Audit, Operation::Read)?;
    let (audits, total) = service.list(&user, &filter, &pagination).await?;
    Ok(Json(Paginated::new(audits, total, &pagination)))
}

/// Create a hearing record
#[utoipa::path(
    post,
    path = "/api/audits",
    request_body = CreateAuditDto,
    responses(
        (status = 201, description = "Hearing record created", body = AuditResponseDto),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "audits"
)]
pub async fn create_audit(
    user: AuthenticatedUser,
    State(service): State<Arc<AuditService>>,
    AppJson(dto): AppJson<CreateAuditDto>,
) -> Result<(StatusCode, Json<AuditResponseDto>)> {
    policy::authorize(&user, Resource::Audit, Operation::Create)?;
    dto.validate()?;
    let created = service.create(&user, dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Show one hearing record
#[utoipa::path(
    get,
    path = "/api/audits/{id}",
    params(("id" = i64, Path, description = "Hearing record id")),
    responses(
        (status = 200, description = "Hearing record", body = AuditResponseDto),
        (status = 404, description = "Hearing record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "audits"
)]
pub async fn get_audit(
    user: AuthenticatedUser,
    State(service): State<Arc<AuditService>>,
    Path(id): Path<i64>,
) -> Result<Json<AuditResponseDto>> {
    policy::authorize(&user, Resource::Audit, Operation::Read)?;
    let audit = service.get(&user, id).await?;
    Ok(Json(audit))
}

/// Update a hearing record
#[utoipa::path(
    patch,
    path = "/api/audits/{id}",
    params(("id" = i64, Path, description = "Hearing record id")),
    request_body = UpdateAuditDto,
    responses(
        (status = 200, description = "Hearing record updated", body = AuditResponseDto),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 404, description = "Hearing record not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "audits"
)]
pub async fn update_audit(
    user: AuthenticatedUser,
    State(service): State<Arc<AuditService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateAuditDto>,
) -> Result<Json<AuditResponseDto>> {
    policy::authorize(&user, Resource::Audit, Operation::Update)?;
    dto.validate()?;
    let updated = service.update(&user, id, dto).await?;
    Ok(Json(updated))
}

/// Delete a hearing record
#[utoipa::path(
    delete,
    path = "/api/audits/{id}",
    params(("id" = i64, Path, description = "Hearing record id")),
    responses(
        (status = 200, description = "Hearing record deleted", body = MessageResponse),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 404, description = "Hearing record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "audits"
)]
pub async fn delete_audit(
    user: AuthenticatedUser,
    State(service): State<Arc<AuditService>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    policy::authorize(&user, Resource::Audit, Operation::Delete)?;
    service.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("Enregistrement d'audience supprimé.")))
}
