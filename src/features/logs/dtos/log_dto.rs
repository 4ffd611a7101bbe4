use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::logs::models::LogRow;
use crate::features::users::dtos::UserSummaryDto;

/// Response DTO for one activity trail entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogResponseDto {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<i64>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummaryDto>,
}

impl From<LogRow> for LogResponseDto {
    fn from(row: LogRow) -> Self {
        let user = match (row.user_id, row.user_name, row.user_email) {
            (Some(id), Some(name), Some(email)) => Some(UserSummaryDto { id, name, email }),
            _ => None,
        };
        Self {
            id: row.id,
            user_id: row.user_id,
            action: row.action,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            details: row.details,
            created_at: row.created_at,
            user,
        }
    }
}

/// Filters for the admin trail listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct LogFilterQuery {
    /// Restrict to one acting user
    pub user_id: Option<i64>,
    /// Substring match on the action verb
    pub action: Option<String>,
    /// Entries created on or after this date
    pub from: Option<NaiveDate>,
    /// Entries created on or before this date
    pub to: Option<NaiveDate>,
}
