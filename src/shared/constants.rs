/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - full access, including user management and the activity trail
pub const ROLE_ADMIN: &str = "admin";

/// Archivist role - manages documents, categories, files and hearing records
pub const ROLE_ARCHIVISTE: &str = "archiviste";

/// Regular user role - read-only access to the archive
pub const ROLE_UTILISATEUR: &str = "utilisateur";
