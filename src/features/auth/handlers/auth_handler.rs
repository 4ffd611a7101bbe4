use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{LoginRequestDto, RegisterRequestDto, TokenResponseDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::features::users::dtos::UserResponseDto;
use crate::shared::types::MessageResponse;

/// Register an account
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "Account created, token issued", body = TokenResponseDto),
        (status = 422, description = "Validation failed")
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<TokenResponseDto>)> {
    dto.validate()?;
    let response = service.register(dto).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Token issued", body = TokenResponseDto),
        (status = 422, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<TokenResponseDto>> {
    dto.validate()?;
    let response = service.login(dto).await?;
    Ok(Json(response))
}

/// Logout: the trail records the action, the client discards the token
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Logout recorded", body = MessageResponse),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<MessageResponse>> {
    service.logout(&user).await;
    Ok(Json(MessageResponse::new("Déconnexion réussie.")))
}

/// Current account
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current account", body = UserResponseDto),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<UserResponseDto>> {
    let response = service.me(&user).await?;
    Ok(Json(response))
}
