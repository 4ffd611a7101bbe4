use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::audits::dtos::{
    AuditFilterQuery, AuditResponseDto, CreateAuditDto, UpdateAuditDto,
};
use crate::features::audits::models::Audit;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::DocumentSummaryDto;
use crate::features::logs::LogService;
use crate::features::users::dtos::UserSummaryDto;
use crate::shared::types::PaginationQuery;

/// Service for hearing records (enregistrements d'audience)
pub struct AuditService {
    pool: PgPool,
    logs: Arc<LogService>,
}

impl AuditService {
    pub fn new(pool: PgPool, logs: Arc<LogService>) -> Self {
        Self { pool, logs }
    }

    /// List hearing records, newest first
    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        filter: &AuditFilterQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<AuditResponseDto>, i64)> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM audits a WHERE 1=1");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT a.* FROM audits a WHERE 1=1");
        push_filters(&mut query, filter);
        query.push(" ORDER BY a.created_at DESC LIMIT ");
        query.push_bind(pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(pagination.offset());

        let audits = query
            .build_query_as::<Audit>()
            .fetch_all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(audits.len());
        for audit in audits {
            items.push(self.load_relations(audit).await?);
        }

        self.logs
            .record(
                Some(actor),
                "consultation_liste",
                Some("Audit"),
                None,
                "Consultation de la liste des audiences",
            )
            .await;

        Ok((items, total))
    }

    /// Create a hearing record for an existing document
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateAuditDto,
    ) -> Result<AuditResponseDto> {
        let document_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM documents WHERE id = $1)")
                .bind(dto.document_id)
                .fetch_one(&self.pool)
                .await?;
        if !document_exists {
            return Err(AppError::field_error(
                "document_id",
                "Le document sélectionné n'existe pas",
            ));
        }

        let audit = sqlx::query_as::<_, Audit>(
            r#"
            INSERT INTO audits (document_id, user_id, title, description, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(dto.document_id)
        .bind(actor.id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.date)
        .fetch_one(&self.pool)
        .await?;

        self.logs
            .record(
                Some(actor),
                "creation",
                Some("Audit"),
                Some(audit.id),
                "Création d'un enregistrement d'audience",
            )
            .await;

        self.load_relations(audit).await
    }

    /// Fetch one hearing record with its relations
    pub async fn get(&self, actor: &AuthenticatedUser, id: i64) -> Result<AuditResponseDto> {
        let audit = self.find(id).await?;

        self.logs
            .record(
                Some(actor),
                "consultation",
                Some("Audit"),
                Some(id),
                "Consultation d'un enregistrement d'audience",
            )
            .await;

        self.load_relations(audit).await
    }

    /// Partial update of a hearing record
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
        dto: UpdateAuditDto,
    ) -> Result<AuditResponseDto> {
        let audit = self.find(id).await?;

        let title = dto.title.unwrap_or(audit.title);
        let description = dto.description.or(audit.description);
        let date = dto.date.unwrap_or(audit.date);

        let updated = sqlx::query_as::<_, Audit>(
            r#"
            UPDATE audits
            SET title = $1, description = $2, date = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&title)
        .bind(&description)
        .bind(date)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        self.logs
            .record(
                Some(actor),
                "modification",
                Some("Audit"),
                Some(id),
                "Modification d'un enregistrement d'audience",
            )
            .await;

        self.load_relations(updated).await
    }

    /// Delete a hearing record
    pub async fn delete(&self, actor: &AuthenticatedUser, id: i64) -> Result<()> {
        self.find(id).await?;

        sqlx::query("DELETE FROM audits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.logs
            .record(
                Some(actor),
                "suppression",
                Some("Audit"),
                Some(id),
                "Suppression d'un enregistrement d'audience",
            )
            .await;

        Ok(())
    }

    async fn find(&self, id: i64) -> Result<Audit> {
        sqlx::query_as::<_, Audit>("SELECT * FROM audits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Audience {} introuvable", id)))
    }

    async fn load_relations(&self, audit: Audit) -> Result<AuditResponseDto> {
        let user = sqlx::query_as::<_, UserSummaryDto>(
            "SELECT id, name, email FROM users WHERE id = $1",
        )
        .bind(audit.user_id)
        .fetch_optional(&self.pool)
        .await?;

        let document = sqlx::query_as::<_, DocumentSummaryDto>(
            "SELECT id, title, etat, created_at FROM documents WHERE id = $1",
        )
        .bind(audit.document_id)
        .fetch_optional(&self.pool)
        .await?;

        let mut dto: AuditResponseDto = audit.into();
        dto.user = user;
        dto.document = document;
        Ok(dto)
    }
}

fn push_filters(query: &mut QueryBuilder<Postgres>, filter: &AuditFilterQuery) {
    if let Some(document_id) = filter.document_id {
        query.push(" AND a.document_id = ");
        query.push_bind(document_id);
    }
    if let Some(user_id) = filter.user_id {
        query.push(" AND a.user_id = ");
        query.push_bind(user_id);
    }
    if let Some(from) = filter.from {
        query.push(" AND a.created_at::date >= ");
        query.push_bind(from);
    }
    if let Some(to) = filter.to {
        query.push(" AND a.created_at::date <= ");
        query.push_bind(to);
    }
}
