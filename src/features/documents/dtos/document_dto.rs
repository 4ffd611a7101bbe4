use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::documents::models::{Document, Etat};
use crate::features::files::dtos::FileResponseDto;
use crate::features::users::dtos::UserSummaryDto;

/// Response DTO for a document with its relations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponseDto {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub etat: String,
    pub category_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Option<UserSummaryDto>,
    pub category: Option<CategorySummaryDto>,
    pub files: Vec<FileResponseDto>,
}

/// Short document reference embedded in categories and files
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DocumentSummaryDto {
    pub id: i64,
    pub title: String,
    pub etat: String,
    pub created_at: DateTime<Utc>,
}

impl From<Document> for DocumentSummaryDto {
    fn from(d: Document) -> Self {
        Self {
            id: d.id,
            title: d.title,
            etat: d.etat,
            created_at: d.created_at,
        }
    }
}

/// Fields of a document creation request. Files travel alongside in the
/// same multipart body.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateDocumentDto {
    #[validate(length(min = 1, max = 255, message = "Le titre est obligatoire (255 caractères max)"))]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[validate(range(min = 1, message = "La catégorie est obligatoire"))]
    pub category_id: i64,
}

/// Request DTO for updating a document (partial)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateDocumentDto {
    #[validate(length(min = 1, max = 255, message = "Le titre est obligatoire (255 caractères max)"))]
    pub title: Option<String>,

    pub content: Option<String>,

    #[validate(range(min = 1, message = "La catégorie est obligatoire"))]
    pub category_id: Option<i64>,
}

/// Request DTO for the explicit status transition
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusDto {
    #[validate(custom(function = "validate_etat"))]
    pub etat: String,
}

pub fn validate_etat(etat: &str) -> Result<(), ValidationError> {
    if Etat::parse(etat).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("etat").with_message("L'état doit être actif ou inactif".into()))
    }
}

/// One uploaded file, decoded from a multipart field
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Filters for the document listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct DocumentFilterQuery {
    /// Free-text search across title, content and author name
    pub q: Option<String>,
    /// Restrict to one category
    pub category_id: Option<i64>,
    /// Restrict to one creator
    pub user_id: Option<i64>,
    /// Lifecycle filter; the listing defaults to active documents
    pub etat: Option<String>,
    /// Documents created on or after this date
    pub from: Option<NaiveDate>,
    /// Documents created on or before this date
    pub to: Option<NaiveDate>,
}

/// Ids of the documents to include in a batch export, comma-separated
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ExportMultipleQuery {
    pub ids: String,
}

/// Confirmation for the logical delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentDeletedDto {
    pub message: String,
    pub document_id: i64,
}

/// Response for the "add files" operation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FilesAddedDto {
    pub message: String,
    pub files: Vec<FileResponseDto>,
    pub document: DocumentResponseDto,
}

/// Per-file detail in the per-document file listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileDetailDto {
    pub id: i64,
    pub original_name: String,
    pub path: String,
    pub mime_type: String,
    pub size: i64,
    pub formatted_size: String,
    pub exists_on_disk: bool,
    pub uploaded_by: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub folder: String,
}

/// Document header in the per-document file listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentFolderDto {
    pub id: i64,
    pub title: String,
    pub folder_path: String,
}

/// Response for the per-document file listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentFilesDto {
    pub document: DocumentFolderDto,
    pub files: Vec<FileDetailDto>,
    pub total_files: i64,
    pub total_size: i64,
    pub formatted_total_size: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etat_values_are_validated() {
        assert!(validate_etat("actif").is_ok());
        assert!(validate_etat("inactif").is_ok());
        assert!(validate_etat("archivé").is_err());
    }

    #[test]
    fn empty_titles_are_rejected() {
        let dto = CreateDocumentDto {
            title: String::new(),
            content: "corps".to_string(),
            category_id: 1,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn missing_category_is_rejected() {
        let dto = CreateDocumentDto {
            title: "Jugement".to_string(),
            content: String::new(),
            category_id: 0,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("category_id"));
    }
}
