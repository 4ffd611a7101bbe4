use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::documents::dtos::DocumentSummaryDto;
use crate::features::files::models::File;

/// Response DTO for an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: i64,
    pub document_id: i64,
    pub original_name: String,
    pub path: String,
    pub mime_type: String,
    pub size: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<File> for FileResponseDto {
    fn from(f: File) -> Self {
        Self {
            id: f.id,
            document_id: f.document_id,
            original_name: f.original_name,
            path: f.path,
            mime_type: f.mime_type,
            size: f.size,
            user_id: f.user_id,
            created_at: f.created_at,
        }
    }
}

/// Detail view embedding the owning document
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileWithDocumentDto {
    #[serde(flatten)]
    pub file: FileResponseDto,
    pub document: Option<DocumentSummaryDto>,
}

/// Filters for the global file listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct FileFilterQuery {
    /// Free-text search on the original filename
    pub q: Option<String>,
    /// Restrict to files of documents in one category
    pub category_id: Option<i64>,
    /// Restrict to one document's files
    pub document_id: Option<i64>,
}

/// Human-readable file size (e.g. "2.53 MB")
pub fn format_bytes(size: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if size <= 0 {
        return "0 B".to_string();
    }

    let exponent = ((size as f64).log(1024.0).floor() as usize).min(UNITS.len() - 1);
    let value = size as f64 / 1024f64.powi(exponent as i32);

    if exponent == 0 {
        format!("{} {}", size, UNITS[exponent])
    } else {
        format!("{:.2} {}", value, UNITS[exponent])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_stay_integral() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
    }

    #[test]
    fn larger_sizes_use_two_decimals() {
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(20 * 1024 * 1024), "20.00 MB");
        assert_eq!(format_bytes(5_368_709_120), "5.00 GB");
    }

    #[test]
    fn negative_sizes_are_clamped() {
        assert_eq!(format_bytes(-42), "0 B");
    }
}
