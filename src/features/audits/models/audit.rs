use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database model for a hearing record (enregistrement d'audience)
/// attached to a document
#[derive(Debug, Clone, FromRow)]
pub struct Audit {
    pub id: i64,
    pub document_id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
