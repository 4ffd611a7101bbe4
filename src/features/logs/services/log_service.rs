use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::logs::dtos::{LogFilterQuery, LogResponseDto};
use crate::features::logs::models::LogRow;
use crate::shared::types::PaginationQuery;

/// Writer and reader for the append-only activity trail.
///
/// `record` is fire-and-forget: a failed insert is reported to the
/// operational log and never fails nor rolls back the operation that
/// triggered it.
pub struct LogService {
    pool: PgPool,
}

impl LogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one trail entry for an observable action.
    pub async fn record(
        &self,
        actor: Option<&AuthenticatedUser>,
        action: &str,
        resource_type: Option<&str>,
        resource_id: Option<i64>,
        details: impl Into<String>,
    ) {
        let result = sqlx::query(
            r#"
            INSERT INTO logs (user_id, action, resource_type, resource_id, details)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(actor.map(|u| u.id))
        .bind(action)
        .bind(resource_type)
        .bind(resource_id)
        .bind(details.into())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::error!("Failed to record trail entry (action={}): {:?}", action, e);
        }
    }

    /// List trail entries, newest first
    pub async fn list(
        &self,
        filter: &LogFilterQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<LogResponseDto>, i64)> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM logs l WHERE 1=1");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT l.id, l.user_id, l.action, l.resource_type, l.resource_id,
                   l.details, l.created_at, u.name AS user_name, u.email AS user_email
            FROM logs l
            LEFT JOIN users u ON u.id = l.user_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut query, filter);
        query.push(" ORDER BY l.created_at DESC LIMIT ");
        query.push_bind(pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(pagination.offset());

        let rows = query
            .build_query_as::<LogRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Fetch a single trail entry
    pub async fn get(&self, id: i64) -> Result<LogResponseDto> {
        let row = sqlx::query_as::<_, LogRow>(
            r#"
            SELECT l.id, l.user_id, l.action, l.resource_type, l.resource_id,
                   l.details, l.created_at, u.name AS user_name, u.email AS user_email
            FROM logs l
            LEFT JOIN users u ON u.id = l.user_id
            WHERE l.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Entrée de journal {} introuvable", id)))
    }
}

fn push_filters(query: &mut QueryBuilder<Postgres>, filter: &LogFilterQuery) {
    if let Some(user_id) = filter.user_id {
        query.push(" AND l.user_id = ");
        query.push_bind(user_id);
    }
    if let Some(action) = &filter.action {
        query.push(" AND l.action LIKE ");
        query.push_bind(format!("%{}%", action));
    }
    if let Some(from) = filter.from {
        query.push(" AND l.created_at::date >= ");
        query.push_bind(from);
    }
    if let Some(to) = filter.to {
        query.push(" AND l.created_at::date <= ");
        query.push_bind(to);
    }
}
