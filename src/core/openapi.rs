use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::core::error::ErrorBody;
use crate::features::audits::{dtos as audits_dtos, handlers as audits_handlers};
use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers, model as auth_model};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::documents::{dtos as documents_dtos, handlers as documents_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::logs::{dtos as logs_dtos, handlers as logs_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{MessageResponse, Paginated};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::logout,
        auth_handlers::me,
        // Documents
        documents_handlers::list_documents,
        documents_handlers::create_document,
        documents_handlers::get_document,
        documents_handlers::update_document,
        documents_handlers::delete_document,
        documents_handlers::update_document_status,
        documents_handlers::restore_document,
        documents_handlers::export_document,
        documents_handlers::export_multiple_documents,
        documents_handlers::add_document_files,
        documents_handlers::list_document_files,
        documents_handlers::download_document_file,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::create_category,
        categories_handlers::get_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Files
        files_handlers::list_files,
        files_handlers::get_file,
        files_handlers::download_file,
        files_handlers::delete_file,
        // Hearing records
        audits_handlers::list_audits,
        audits_handlers::create_audit,
        audits_handlers::get_audit,
        audits_handlers::update_audit,
        audits_handlers::delete_audit,
        // Activity trail (admin)
        logs_handlers::list_logs,
        logs_handlers::get_log,
        // Users (admin)
        users_handlers::list_users,
        users_handlers::create_user,
        users_handlers::get_user,
        users_handlers::update_user,
        users_handlers::delete_user,
    ),
    components(
        schemas(
            // Shared
            MessageResponse,
            ErrorBody,
            // Auth
            auth_model::Role,
            auth_model::AuthenticatedUser,
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::TokenResponseDto,
            // Users
            users_dtos::UserResponseDto,
            users_dtos::UserSummaryDto,
            users_dtos::UserWithCountsDto,
            users_dtos::CreateUserDto,
            users_dtos::UpdateUserDto,
            Paginated<users_dtos::UserWithCountsDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategorySummaryDto,
            categories_dtos::CategoryWithCountDto,
            categories_dtos::CategoryDetailDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            Paginated<categories_dtos::CategoryWithCountDto>,
            // Documents
            documents_dtos::DocumentResponseDto,
            documents_dtos::DocumentSummaryDto,
            documents_dtos::CreateDocumentDto,
            documents_dtos::UpdateDocumentDto,
            documents_dtos::UpdateStatusDto,
            documents_dtos::DocumentDeletedDto,
            documents_dtos::FilesAddedDto,
            documents_dtos::FileDetailDto,
            documents_dtos::DocumentFolderDto,
            documents_dtos::DocumentFilesDto,
            Paginated<documents_dtos::DocumentResponseDto>,
            // Files
            files_dtos::FileResponseDto,
            files_dtos::FileWithDocumentDto,
            Paginated<files_dtos::FileResponseDto>,
            // Hearing records
            audits_dtos::AuditResponseDto,
            audits_dtos::CreateAuditDto,
            audits_dtos::UpdateAuditDto,
            Paginated<audits_dtos::AuditResponseDto>,
            // Activity trail
            logs_dtos::LogResponseDto,
            Paginated<logs_dtos::LogResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "documents", description = "Archived documents: lifecycle, files and exports"),
        (name = "categories", description = "Filing categories"),
        (name = "files", description = "Archive-wide file access"),
        (name = "audits", description = "Hearing records attached to documents"),
        (name = "logs", description = "Append-only activity trail (admin only)"),
        (name = "users", description = "Account management (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Greffe API",
        version = "0.1.0",
        description = "API documentation for the tribunal document archive",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
