use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::dtos::{validate_role, UserResponseDto};

/// Request DTO for account registration
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(length(min = 1, max = 255, message = "Le nom est obligatoire (255 caractères max)"))]
    pub name: String,

    #[validate(email(message = "Adresse e-mail invalide"))]
    pub email: String,

    #[validate(length(min = 8, message = "Le mot de passe doit contenir au moins 8 caractères"))]
    pub password: String,

    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

/// Request DTO for login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Adresse e-mail invalide"))]
    pub email: String,

    #[validate(length(min = 1, message = "Le mot de passe est obligatoire"))]
    pub password: String,
}

/// Bearer token response for register/login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponseDto {
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponseDto,
}

impl TokenResponseDto {
    pub fn bearer(access_token: String, user: UserResponseDto) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            user,
        }
    }
}
