use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// List envelope returned by every paginated endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub current_page: i64,
    pub per_page: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, query: &PaginationQuery) -> Self {
        Self {
            data,
            total,
            current_page: query.page.max(1),
            per_page: query.limit(),
        }
    }
}

/// Simple confirmation body for operations without an entity response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Standard pagination query parameters for all list endpoints.
/// This is a shared struct that can be embedded or used directly in handlers.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    /// Calculate SQL OFFSET from page number
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    /// Get clamped per_page (respects MAX_PAGE_SIZE)
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_on_first_page() {
        let query = PaginationQuery {
            page: 1,
            per_page: 10,
        };
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn offset_advances_with_pages() {
        let query = PaginationQuery {
            page: 3,
            per_page: 15,
        };
        assert_eq!(query.offset(), 30);
        assert_eq!(query.limit(), 15);
    }

    #[test]
    fn per_page_is_clamped_to_ceiling() {
        let query = PaginationQuery {
            page: 1,
            per_page: 5000,
        };
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn envelope_serializes_with_wire_field_names() {
        let envelope = Paginated::new(vec![1, 2, 3], 3, &PaginationQuery::default());
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["total"], 3);
        assert_eq!(value["current_page"], 1);
        assert_eq!(value["per_page"], 10);
        assert_eq!(value["data"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn nonsense_page_numbers_are_normalized() {
        let query = PaginationQuery {
            page: -4,
            per_page: 0,
        };
        assert_eq!(query.offset(), 0);
        assert_eq!(query.limit(), 1);
        let envelope = Paginated::new(Vec::<i64>::new(), 0, &query);
        assert_eq!(envelope.current_page, 1);
    }
}
