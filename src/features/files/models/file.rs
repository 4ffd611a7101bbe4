use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for an uploaded file
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct File {
    pub id: i64,
    pub document_id: i64,
    pub original_name: String,
    /// Relative path under the storage root
    pub path: String,
    pub mime_type: String,
    pub size: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
