use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::audits::models::Audit;
use crate::features::documents::dtos::DocumentSummaryDto;
use crate::features::users::dtos::UserSummaryDto;

/// Response DTO for a hearing record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditResponseDto {
    pub id: i64,
    pub document_id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummaryDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentSummaryDto>,
}

impl From<Audit> for AuditResponseDto {
    fn from(a: Audit) -> Self {
        Self {
            id: a.id,
            document_id: a.document_id,
            user_id: a.user_id,
            title: a.title,
            description: a.description,
            date: a.date,
            created_at: a.created_at,
            updated_at: a.updated_at,
            user: None,
            document: None,
        }
    }
}

/// Request DTO for creating a hearing record
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAuditDto {
    #[validate(range(min = 1, message = "Le document est obligatoire"))]
    pub document_id: i64,

    #[validate(length(min = 1, max = 255, message = "Le titre est obligatoire (255 caractères max)"))]
    pub title: String,

    pub description: Option<String>,

    pub date: NaiveDate,
}

/// Request DTO for updating a hearing record (partial)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateAuditDto {
    #[validate(length(min = 1, max = 255, message = "Le titre est obligatoire (255 caractères max)"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub date: Option<NaiveDate>,
}

/// Filters for the hearing-record listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AuditFilterQuery {
    /// Restrict to one document
    pub document_id: Option<i64>,
    /// Restrict to one author
    pub user_id: Option<i64>,
    /// Records created on or after this date
    pub from: Option<NaiveDate>,
    /// Records created on or before this date
    pub to: Option<NaiveDate>,
}
