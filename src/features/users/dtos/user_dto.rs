use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::features::auth::model::Role;
use crate::features::users::models::User;

/// Response DTO for a user account. The password hash never leaves the
/// service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Short user reference embedded in other resources
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct UserSummaryDto {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// List item with relation counts (admin listing)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserWithCountsDto {
    #[serde(flatten)]
    pub user: UserResponseDto,
    pub documents_count: i64,
    pub logs_count: i64,
}

/// Request DTO for creating a user (admin)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 255, message = "Le nom est obligatoire (255 caractères max)"))]
    pub name: String,

    #[validate(email(message = "Adresse e-mail invalide"))]
    pub email: String,

    #[validate(length(min = 8, message = "Le mot de passe doit contenir au moins 8 caractères"))]
    pub password: String,

    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

/// Request DTO for updating a user (admin, partial)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 255, message = "Le nom est obligatoire (255 caractères max)"))]
    pub name: Option<String>,

    #[validate(email(message = "Adresse e-mail invalide"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Le mot de passe doit contenir au moins 8 caractères"))]
    pub password: Option<String>,

    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
}

/// Filters for the admin user listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UserFilterQuery {
    /// Restrict to one role
    pub role: Option<String>,
    /// Free-text search across name and email
    pub q: Option<String>,
}

pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    if Role::parse(role).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("role")
            .with_message("Le rôle doit être admin, archiviste ou utilisateur".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_are_accepted() {
        for role in ["admin", "archiviste", "utilisateur"] {
            assert!(validate_role(role).is_ok(), "role {} should be valid", role);
        }
    }

    #[test]
    fn unknown_roles_are_rejected() {
        let dto = CreateUserDto {
            name: "Greffier".to_string(),
            email: "greffier@tribunal.test".to_string(),
            password: "motdepasse".to_string(),
            role: "super_admin".to_string(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("role"));
    }

    #[test]
    fn short_passwords_are_rejected() {
        let dto = CreateUserDto {
            name: "Greffier".to_string(),
            email: "greffier@tribunal.test".to_string(),
            password: "court".to_string(),
            role: "utilisateur".to_string(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}
