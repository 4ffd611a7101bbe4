use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::dtos::{
    CategoryDetailDto, CategoryResponseDto, CategoryWithCountDto, CreateCategoryDto,
    UpdateCategoryDto,
};
use crate::features::categories::models::Category;
use crate::features::documents::dtos::DocumentSummaryDto;
use crate::features::logs::LogService;
use crate::shared::types::PaginationQuery;

/// Service for filing-category operations
pub struct CategoryService {
    pool: PgPool,
    logs: Arc<LogService>,
}

impl CategoryService {
    pub fn new(pool: PgPool, logs: Arc<LogService>) -> Self {
        Self { pool, logs }
    }

    /// List categories alphabetically with their document counts
    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<CategoryWithCountDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, CategoryWithCountRow>(
            r#"
            SELECT c.*,
                   (SELECT COUNT(*) FROM documents d WHERE d.category_id = c.id) AS documents_count
            FROM categories c
            ORDER BY c.name
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        self.logs
            .record(
                Some(actor),
                "consultation_liste",
                Some("Category"),
                None,
                "Consultation de la liste des catégories",
            )
            .await;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Create a category with a unique name
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateCategoryDto,
    ) -> Result<CategoryResponseDto> {
        self.ensure_name_free(&dto.name, None).await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .fetch_one(&self.pool)
        .await?;

        self.logs
            .record(
                Some(actor),
                "creation",
                Some("Category"),
                Some(category.id),
                "Création d'une catégorie",
            )
            .await;

        Ok(category.into())
    }

    /// Fetch a category with its documents
    pub async fn get(&self, actor: &AuthenticatedUser, id: i64) -> Result<CategoryDetailDto> {
        let category = self.find(id).await?;

        let documents = sqlx::query_as::<_, DocumentSummaryDto>(
            r#"
            SELECT id, title, etat, created_at
            FROM documents
            WHERE category_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        self.logs
            .record(
                Some(actor),
                "consultation",
                Some("Category"),
                Some(id),
                "Consultation d'une catégorie",
            )
            .await;

        Ok(CategoryDetailDto {
            category: category.into(),
            documents,
        })
    }

    /// Partial update with name-uniqueness check
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
        dto: UpdateCategoryDto,
    ) -> Result<CategoryResponseDto> {
        let category = self.find(id).await?;

        if let Some(name) = &dto.name {
            if name != &category.name {
                self.ensure_name_free(name, Some(id)).await?;
            }
        }

        let name = dto.name.unwrap_or(category.name);
        let description = dto.description.or(category.description);

        let updated = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, description = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        self.logs
            .record(
                Some(actor),
                "modification",
                Some("Category"),
                Some(id),
                "Modification d'une catégorie",
            )
            .await;

        Ok(updated.into())
    }

    /// Delete a category. Refused while active documents are attached.
    pub async fn delete(&self, actor: &AuthenticatedUser, id: i64) -> Result<()> {
        self.find(id).await?;

        let active_documents: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE category_id = $1 AND etat = 'actif'",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if active_documents > 0 {
            return Err(AppError::Conflict(format!(
                "Impossible de supprimer la catégorie: {} document(s) actif(s) y sont rattachés.",
                active_documents
            )));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                self.logs
                    .record(
                        Some(actor),
                        "suppression",
                        Some("Category"),
                        Some(id),
                        "Suppression d'une catégorie",
                    )
                    .await;
                Ok(())
            }
            // Inactive documents still reference the category
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23503") => {
                Err(AppError::Conflict(
                    "Impossible de supprimer la catégorie: des documents y sont rattachés."
                        .to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, id: i64) -> Result<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Catégorie {} introuvable", id)))
    }

    async fn ensure_name_free(&self, name: &str, excluding: Option<i64>) -> Result<()> {
        let taken: bool = match excluding {
            Some(id) => sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1 AND id <> $2)",
            )
            .bind(name)
            .bind(id)
            .fetch_one(&self.pool)
            .await?,
            None => sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?,
        };

        if taken {
            Err(AppError::field_error(
                "name",
                "Ce nom de catégorie est déjà utilisé",
            ))
        } else {
            Ok(())
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryWithCountRow {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    documents_count: i64,
}

impl From<CategoryWithCountRow> for CategoryWithCountDto {
    fn from(row: CategoryWithCountRow) -> Self {
        Self {
            category: CategoryResponseDto {
                id: row.id,
                name: row.name,
                description: row.description,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            documents_count: row.documents_count,
        }
    }
}
