use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::{self, Operation, Resource};
use crate::features::users::dtos::{
    CreateUserDto, UpdateUserDto, UserFilterQuery, UserResponseDto, UserWithCountsDto,
};
use crate::features::users::services::UserService;
use crate::shared::types::{MessageResponse, Paginated, PaginationQuery};

/// List accounts (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Paginated accounts", body = Paginated<UserWithCountsDto>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Query(filter): Query<UserFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Paginated<UserWithCountsDto>>> {
    policy::authorize(&user, Resource::User, Operation::Read)?;
    let (users, total) = service.list(&user, &filter, &pagination).await?;
    Ok(Json(Paginated::new(users, total, &pagination)))
}

/// Create an account (admin only)
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "Account created", body = UserResponseDto),
        (status = 403, description = "Admin access required"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserResponseDto>)> {
    policy::authorize(&user, Resource::User, Operation::Create)?;
    dto.validate()?;
    let created = service.create(&user, dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Show one account (admin only)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Account", body = UserWithCountsDto),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<i64>,
) -> Result<Json<UserWithCountsDto>> {
    policy::authorize(&user, Resource::User, Operation::Read)?;
    let found = service.get(&user, id).await?;
    Ok(Json(found))
}

/// Update an account (admin only)
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "Account updated", body = UserResponseDto),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Account not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> Result<Json<UserResponseDto>> {
    policy::authorize(&user, Resource::User, Operation::Update)?;
    dto.validate()?;
    let updated = service.update(&user, id, dto).await?;
    Ok(Json(updated))
}

/// Delete an account (admin only, never one's own)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 403, description = "Admin access required or self-deletion"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account still owns documents or files")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    policy::authorize(&user, Resource::User, Operation::Delete)?;
    service.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("Utilisateur supprimé avec succès")))
}
