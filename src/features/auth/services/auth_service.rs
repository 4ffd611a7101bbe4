use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, RegisterRequestDto, TokenResponseDto};
use crate::features::auth::model::{AuthenticatedUser, Role};
use crate::features::auth::services::password::{hash_password, verify_password};
use crate::features::auth::services::TokenService;
use crate::features::logs::LogService;
use crate::features::users::dtos::UserResponseDto;
use crate::features::users::models::User;

/// Registration, login and session endpoints' logic
pub struct AuthService {
    pool: PgPool,
    token_service: Arc<TokenService>,
    logs: Arc<LogService>,
}

impl AuthService {
    pub fn new(pool: PgPool, token_service: Arc<TokenService>, logs: Arc<LogService>) -> Self {
        Self {
            pool,
            token_service,
            logs,
        }
    }

    /// Create an account and issue its first bearer token
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<TokenResponseDto> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&dto.email)
                .fetch_one(&self.pool)
                .await?;
        if taken {
            return Err(AppError::field_error(
                "email",
                "Cette adresse e-mail est déjà utilisée",
            ));
        }

        let password_hash = hash_password(&dto.password)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(&dto.role)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Account created: id={}, role={}", user.id, user.role);

        let actor = self.to_actor(&user)?;
        self.logs
            .record(
                Some(&actor),
                "inscription",
                Some("User"),
                Some(user.id),
                "Création d'un compte utilisateur",
            )
            .await;

        let token = self.token_service.issue(&actor)?;
        Ok(TokenResponseDto::bearer(token, user.into()))
    }

    /// Verify credentials and issue a bearer token
    pub async fn login(&self, dto: LoginRequestDto) -> Result<TokenResponseDto> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&dto.email)
            .fetch_optional(&self.pool)
            .await?;

        // Same failure for unknown account and wrong password
        let user = match user {
            Some(user) if verify_password(&dto.password, &user.password_hash) => user,
            _ => {
                return Err(AppError::field_error(
                    "email",
                    "Les informations d'identification sont incorrectes.",
                ))
            }
        };

        let actor = self.to_actor(&user)?;
        self.logs
            .record(
                Some(&actor),
                "connexion",
                Some("User"),
                Some(user.id),
                "Connexion utilisateur",
            )
            .await;

        let token = self.token_service.issue(&actor)?;
        Ok(TokenResponseDto::bearer(token, user.into()))
    }

    /// Record the logout; tokens are stateless so the client simply
    /// discards its copy
    pub async fn logout(&self, actor: &AuthenticatedUser) {
        self.logs
            .record(
                Some(actor),
                "deconnexion",
                Some("User"),
                Some(actor.id),
                "Déconnexion utilisateur",
            )
            .await;
    }

    /// Current account, fresh from the database
    pub async fn me(&self, actor: &AuthenticatedUser) -> Result<UserResponseDto> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(actor.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Compte introuvable".to_string()))?;

        self.logs
            .record(
                Some(actor),
                "consultation",
                Some("User"),
                Some(actor.id),
                "Consultation de son propre compte",
            )
            .await;

        Ok(user.into())
    }

    fn to_actor(&self, user: &User) -> Result<AuthenticatedUser> {
        let role = Role::parse(&user.role)
            .ok_or_else(|| AppError::Internal(format!("Unknown role in users table: {}", user.role)))?;
        Ok(AuthenticatedUser {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role,
        })
    }
}
