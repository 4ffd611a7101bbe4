use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One row of the append-only activity trail, joined with the acting user
/// for display. Rows are written once and never updated or deleted.
#[derive(Debug, Clone, FromRow)]
pub struct LogRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<i64>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}
