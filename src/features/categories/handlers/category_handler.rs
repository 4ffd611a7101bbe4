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
use crate::features::categories::dtos::{
    CategoryDetailDto, CategoryResponseDto, CategoryWithCountDto, CreateCategoryDto,
    UpdateCategoryDto,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::{MessageResponse, Paginated, PaginationQuery};

/// List categories with document counts
#[utoipa::path(
    get,
    path = "/api/categories",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Paginated categories", body = Paginated<CategoryWithCountDto>)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_categories(
    user: AuthenticatedUser,
    State(service): State<Arc<CategoryService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Paginated<CategoryWithCountDto>>> {
    policy::authorize(&user, Resource::Category, Operation::Read)?;
    let (categories, total) = service.list(&user, &pagination).await?;
    Ok(Json(Paginated::new(categories, total, &pagination)))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryResponseDto),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 422, description = "Validation failed (duplicate name)")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    user: AuthenticatedUser,
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<CategoryResponseDto>)> {
    policy::authorize(&user, Resource::Category, Operation::Create)?;
    dto.validate()?;
    let created = service.create(&user, dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Show a category with its documents
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = CategoryDetailDto),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_category(
    user: AuthenticatedUser,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryDetailDto>> {
    policy::authorize(&user, Resource::Category, Operation::Read)?;
    let category = service.get(&user, id).await?;
    Ok(Json(category))
}

/// Update a category
#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponseDto),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Validation failed (duplicate name)")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category(
    user: AuthenticatedUser,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<CategoryResponseDto>> {
    policy::authorize(&user, Resource::Category, Operation::Update)?;
    dto.validate()?;
    let updated = service.update(&user, id, dto).await?;
    Ok(Json(updated))
}

/// Delete a category (refused while active documents are attached)
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 403, description = "Admin or archiviste access required"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Active documents still attached")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    user: AuthenticatedUser,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    policy::authorize(&user, Resource::Category, Operation::Delete)?;
    service.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("Catégorie supprimée avec succès")))
}
