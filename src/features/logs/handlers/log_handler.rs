use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::{self, Operation, Resource};
use crate::features::logs::dtos::{LogFilterQuery, LogResponseDto};
use crate::features::logs::services::LogService;
use crate::shared::types::{Paginated, PaginationQuery};

/// List activity trail entries (admin only)
#[utoipa::path(
    get,
    path = "/api/logs",
    params(LogFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Paginated trail entries", body = Paginated<LogResponseDto>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "logs"
)]
pub async fn list_logs(
    user: AuthenticatedUser,
    State(service): State<Arc<LogService>>,
    Query(filter): Query<LogFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Paginated<LogResponseDto>>> {
    policy::authorize(&user, Resource::Log, Operation::Read)?;

    let (logs, total) = service.list(&filter, &pagination).await?;
    service
        .record(
            Some(&user),
            "consultation_liste",
            Some("Log"),
            None,
            "Consultation du journal d'activité",
        )
        .await;

    Ok(Json(Paginated::new(logs, total, &pagination)))
}

/// Show one activity trail entry (admin only)
#[utoipa::path(
    get,
    path = "/api/logs/{id}",
    params(("id" = i64, Path, description = "Trail entry id")),
    responses(
        (status = 200, description = "Trail entry", body = LogResponseDto),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "logs"
)]
pub async fn get_log(
    user: AuthenticatedUser,
    State(service): State<Arc<LogService>>,
    Path(id): Path<i64>,
) -> Result<Json<LogResponseDto>> {
    policy::authorize(&user, Resource::Log, Operation::Read)?;

    let log = service.get(id).await?;
    service
        .record(
            Some(&user),
            "consultation",
            Some("Log"),
            Some(id),
            "Consultation d'une entrée du journal",
        )
        .await;

    Ok(Json(log))
}
