use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::password::hash_password;
use crate::features::logs::LogService;
use crate::features::users::dtos::{
    CreateUserDto, UpdateUserDto, UserFilterQuery, UserResponseDto, UserWithCountsDto,
};
use crate::features::users::models::User;
use crate::shared::types::PaginationQuery;

/// Admin-only account management
pub struct UserService {
    pool: PgPool,
    logs: Arc<LogService>,
}

impl UserService {
    pub fn new(pool: PgPool, logs: Arc<LogService>) -> Self {
        Self { pool, logs }
    }

    /// List accounts with their document and trail counts, newest first
    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        filter: &UserFilterQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<UserWithCountsDto>, i64)> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users u WHERE 1=1");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT u.*,
                   (SELECT COUNT(*) FROM documents d WHERE d.user_id = u.id) AS documents_count,
                   (SELECT COUNT(*) FROM logs l WHERE l.user_id = u.id) AS logs_count
            FROM users u
            WHERE 1=1
            "#,
        );
        push_filters(&mut query, filter);
        query.push(" ORDER BY u.created_at DESC LIMIT ");
        query.push_bind(pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(pagination.offset());

        let rows = query
            .build_query_as::<UserWithCountsRow>()
            .fetch_all(&self.pool)
            .await?;

        self.logs
            .record(
                Some(actor),
                "consultation_liste",
                Some("User"),
                None,
                "Consultation de la liste des utilisateurs",
            )
            .await;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Create an account (admin path; registration lives in the auth feature)
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateUserDto,
    ) -> Result<UserResponseDto> {
        self.ensure_email_free(&dto.email, None).await?;

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

        self.logs
            .record(
                Some(actor),
                "creation",
                Some("User"),
                Some(user.id),
                "Création d'un utilisateur",
            )
            .await;

        Ok(user.into())
    }

    /// Fetch one account with its counts
    pub async fn get(&self, actor: &AuthenticatedUser, id: i64) -> Result<UserWithCountsDto> {
        let row = sqlx::query_as::<_, UserWithCountsRow>(
            r#"
            SELECT u.*,
                   (SELECT COUNT(*) FROM documents d WHERE d.user_id = u.id) AS documents_count,
                   (SELECT COUNT(*) FROM logs l WHERE l.user_id = u.id) AS logs_count
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Utilisateur {} introuvable", id)))?;

        self.logs
            .record(
                Some(actor),
                "consultation",
                Some("User"),
                Some(id),
                "Consultation d'un utilisateur",
            )
            .await;

        Ok(row.into())
    }

    /// Partial update; the password is rehashed when provided
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
        dto: UpdateUserDto,
    ) -> Result<UserResponseDto> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Utilisateur {} introuvable", id)))?;

        if let Some(email) = &dto.email {
            if email != &user.email {
                self.ensure_email_free(email, Some(id)).await?;
            }
        }

        let name = dto.name.unwrap_or(user.name);
        let email = dto.email.unwrap_or(user.email);
        let role = dto.role.unwrap_or(user.role);
        let password_hash = match dto.password {
            Some(password) => hash_password(&password)?,
            None => user.password_hash,
        };

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $1, email = $2, password_hash = $3, role = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(&email)
        .bind(&password_hash)
        .bind(&role)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        self.logs
            .record(
                Some(actor),
                "modification",
                Some("User"),
                Some(id),
                "Modification d'un utilisateur",
            )
            .await;

        Ok(updated.into())
    }

    /// Delete an account. Self-deletion is refused; accounts still owning
    /// documents or files are protected by foreign keys.
    pub async fn delete(&self, actor: &AuthenticatedUser, id: i64) -> Result<()> {
        if actor.id == id {
            return Err(AppError::Forbidden(
                "Vous ne pouvez pas supprimer votre propre compte.".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                Err(AppError::NotFound(format!("Utilisateur {} introuvable", id)))
            }
            Ok(_) => {
                self.logs
                    .record(
                        Some(actor),
                        "suppression",
                        Some("User"),
                        Some(id),
                        "Suppression d'un utilisateur",
                    )
                    .await;
                Ok(())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23503") => {
                Err(AppError::Conflict(
                    "Impossible de supprimer: cet utilisateur possède encore des documents ou des fichiers.".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_email_free(&self, email: &str, excluding: Option<i64>) -> Result<()> {
        let taken: bool = match excluding {
            Some(id) => {
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id <> $2)")
                    .bind(email)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?,
        };

        if taken {
            Err(AppError::field_error(
                "email",
                "Cette adresse e-mail est déjà utilisée",
            ))
        } else {
            Ok(())
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserWithCountsRow {
    id: i64,
    name: String,
    email: String,
    #[allow(dead_code)]
    password_hash: String,
    role: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    documents_count: i64,
    logs_count: i64,
}

impl From<UserWithCountsRow> for UserWithCountsDto {
    fn from(row: UserWithCountsRow) -> Self {
        Self {
            user: UserResponseDto {
                id: row.id,
                name: row.name,
                email: row.email,
                role: row.role,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            documents_count: row.documents_count,
            logs_count: row.logs_count,
        }
    }
}

fn push_filters(query: &mut QueryBuilder<Postgres>, filter: &UserFilterQuery) {
    if let Some(role) = &filter.role {
        query.push(" AND u.role = ");
        query.push_bind(role.clone());
    }
    if let Some(q) = &filter.q {
        let pattern = format!("%{}%", q);
        query.push(" AND (u.name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR u.email ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}
