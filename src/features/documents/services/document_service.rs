use std::sync::Arc;

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::documents::dtos::{
    CreateDocumentDto, DocumentDeletedDto, DocumentFilesDto, DocumentFilterQuery,
    DocumentFolderDto, DocumentResponseDto, FileDetailDto, FilesAddedDto, UpdateDocumentDto,
    UploadedFile,
};
use crate::features::documents::models::{Document, Etat};
use crate::features::files::dtos::{format_bytes, FileResponseDto};
use crate::features::files::models::File;
use crate::features::logs::LogService;
use crate::features::users::dtos::UserSummaryDto;
use crate::modules::storage::archive::{
    export_document, export_documents, DocumentExport, DocumentManifest, ExportEntry,
};
use crate::modules::storage::FileStore;
use crate::shared::types::PaginationQuery;

/// Service for the document lifecycle: CRUD, status transitions, attached
/// files and zip exports.
pub struct DocumentService {
    pool: PgPool,
    store: FileStore,
    logs: Arc<LogService>,
    max_upload_size: usize,
}

impl DocumentService {
    pub fn new(pool: PgPool, store: FileStore, logs: Arc<LogService>, max_upload_size: usize) -> Self {
        Self {
            pool,
            store,
            logs,
            max_upload_size,
        }
    }

    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size
    }

    /// List documents with their relations, newest first. Defaults to
    /// active documents unless an explicit `etat` filter is given.
    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        filter: &DocumentFilterQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<DocumentResponseDto>, i64)> {
        let etat = match &filter.etat {
            Some(value) => Etat::parse(value).ok_or_else(|| {
                AppError::field_error("etat", "L'état doit être actif ou inactif")
            })?,
            None => Etat::Actif,
        };

        let mut count_query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT COUNT(*)
            FROM documents d
            LEFT JOIN users u ON u.id = d.user_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut count_query, filter, etat);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT d.*, u.name AS user_name, u.email AS user_email, c.name AS category_name
            FROM documents d
            LEFT JOIN users u ON u.id = d.user_id
            LEFT JOIN categories c ON c.id = d.category_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut query, filter, etat);
        query.push(" ORDER BY d.created_at DESC LIMIT ");
        query.push_bind(pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(pagination.offset());

        let rows = query
            .build_query_as::<DocumentListRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let files = self.files_of(row.id).await?;
            documents.push(row.into_dto(files));
        }

        self.logs
            .record(
                Some(actor),
                "consultation_liste",
                Some("Document"),
                None,
                "Consultation des documents",
            )
            .await;

        Ok((documents, total))
    }

    /// Create a document and store its uploaded files. The database rows
    /// share one transaction; physical writes sit outside it, staged and
    /// renamed into the document folder.
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateDocumentDto,
        uploads: Vec<UploadedFile>,
    ) -> Result<DocumentResponseDto> {
        self.ensure_category_exists(dto.category_id).await?;
        self.check_upload_sizes(&uploads)?;

        let mut tx = self.pool.begin().await?;

        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (title, content, etat, category_id, user_id)
            VALUES ($1, $2, 'actif', $3, $4)
            RETURNING *
            "#,
        )
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(dto.category_id)
        .bind(actor.id)
        .fetch_one(&mut *tx)
        .await?;

        let folder = FileStore::document_folder(document.id, document.created_at);
        let mut files = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            let stored = self
                .store
                .store(&folder, &upload.original_name, &upload.data)
                .await?;
            let file = sqlx::query_as::<_, File>(
                r#"
                INSERT INTO files (document_id, original_name, path, mime_type, size, user_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(document.id)
            .bind(&upload.original_name)
            .bind(&stored.relative_path)
            .bind(&upload.content_type)
            .bind(stored.size)
            .bind(actor.id)
            .fetch_one(&mut *tx)
            .await?;
            files.push(file);
        }

        tx.commit().await?;

        tracing::info!(
            "Document created: id={}, files={}, folder={}",
            document.id,
            files.len(),
            folder
        );

        self.logs
            .record(
                Some(actor),
                "creation",
                Some("Document"),
                Some(document.id),
                format!("Document créé: {}", document.title),
            )
            .await;

        self.load_relations(document).await
    }

    /// Fetch one document with relations; inactive documents stay
    /// reachable by id.
    pub async fn get(&self, actor: &AuthenticatedUser, id: i64) -> Result<DocumentResponseDto> {
        let document = self.find(id).await?;

        self.logs
            .record(
                Some(actor),
                "consultation",
                Some("Document"),
                Some(id),
                format!("Consulté: {}", document.title),
            )
            .await;

        self.load_relations(document).await
    }

    /// Partial update of title/content/category
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
        dto: UpdateDocumentDto,
    ) -> Result<DocumentResponseDto> {
        let document = self.find(id).await?;

        if let Some(category_id) = dto.category_id {
            if category_id != document.category_id {
                self.ensure_category_exists(category_id).await?;
            }
        }

        let title = dto.title.unwrap_or(document.title);
        let content = dto.content.unwrap_or(document.content);
        let category_id = dto.category_id.unwrap_or(document.category_id);

        let updated = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET title = $1, content = $2, category_id = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&title)
        .bind(&content)
        .bind(category_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        self.logs
            .record(
                Some(actor),
                "modification",
                Some("Document"),
                Some(id),
                format!("Modifié: {}", updated.title),
            )
            .await;

        self.load_relations(updated).await
    }

    /// Logical delete: the row is kept, only `etat` flips to inactive
    pub async fn destroy(&self, actor: &AuthenticatedUser, id: i64) -> Result<DocumentDeletedDto> {
        let document = self.find(id).await?;

        sqlx::query("UPDATE documents SET etat = 'inactif', updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.logs
            .record(
                Some(actor),
                "suppression_logique",
                Some("Document"),
                Some(id),
                format!("Désactivé: {}", document.title),
            )
            .await;

        Ok(DocumentDeletedDto {
            message: "Document désactivé avec succès".to_string(),
            document_id: id,
        })
    }

    /// Explicit status transition; both directions are allowed
    pub async fn update_status(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
        etat: Etat,
    ) -> Result<DocumentResponseDto> {
        self.find(id).await?;

        let updated = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET etat = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(etat.as_str())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let (action, label) = match etat {
            Etat::Inactif => ("suppression_logique", "Désactivé"),
            Etat::Actif => ("reactivation", "Réactivé"),
        };
        self.logs
            .record(
                Some(actor),
                action,
                Some("Document"),
                Some(id),
                format!("{}: {}", label, updated.title),
            )
            .await;

        self.load_relations(updated).await
    }

    /// Add files to an existing document, reusing its folder
    pub async fn add_files(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
        uploads: Vec<UploadedFile>,
    ) -> Result<FilesAddedDto> {
        if uploads.is_empty() {
            return Err(AppError::field_error(
                "files",
                "Au moins un fichier est requis",
            ));
        }
        self.check_upload_sizes(&uploads)?;

        let document = self.find(id).await?;
        let existing = self.files_of(id).await?;
        let folder = document_folder_of(&document, &existing);

        let mut tx = self.pool.begin().await?;
        let mut added = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            let stored = self
                .store
                .store(&folder, &upload.original_name, &upload.data)
                .await?;
            let file = sqlx::query_as::<_, File>(
                r#"
                INSERT INTO files (document_id, original_name, path, mime_type, size, user_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(&upload.original_name)
            .bind(&stored.relative_path)
            .bind(&upload.content_type)
            .bind(stored.size)
            .bind(actor.id)
            .fetch_one(&mut *tx)
            .await?;
            added.push(file);
        }
        tx.commit().await?;

        self.logs
            .record(
                Some(actor),
                "ajout_fichiers",
                Some("Document"),
                Some(id),
                format!(
                    "Ajout de {} fichier(s) au document: {}",
                    added.len(),
                    document.title
                ),
            )
            .await;

        let message = format!("{} fichier(s) ajouté(s) avec succès", added.len());
        let files = added.into_iter().map(Into::into).collect();
        let document = self.load_relations(document).await?;

        Ok(FilesAddedDto {
            message,
            files,
            document,
        })
    }

    /// Per-document file listing with on-disk status and readable sizes
    pub async fn list_files(&self, actor: &AuthenticatedUser, id: i64) -> Result<DocumentFilesDto> {
        let document = self.find(id).await?;

        let rows = sqlx::query_as::<_, FileWithUploaderRow>(
            r#"
            SELECT f.*, u.name AS uploader_name
            FROM files f
            LEFT JOIN users u ON u.id = f.user_id
            WHERE f.document_id = $1
            ORDER BY f.created_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let folder_path = match rows.first() {
            Some(row) => folder_of(&row.path),
            None => FileStore::document_folder(document.id, document.created_at),
        };

        let total_size: i64 = rows.iter().map(|r| r.size).sum();
        let mut files = Vec::with_capacity(rows.len());
        for row in rows {
            let exists_on_disk = self.store.exists(&row.path).await;
            files.push(FileDetailDto {
                id: row.id,
                folder: folder_of(&row.path),
                original_name: row.original_name,
                path: row.path,
                mime_type: row.mime_type,
                size: row.size,
                formatted_size: format_bytes(row.size),
                exists_on_disk,
                uploaded_by: row.uploader_name,
                uploaded_at: row.created_at,
            });
        }

        self.logs
            .record(
                Some(actor),
                "consultation_fichiers",
                Some("Document"),
                Some(id),
                format!("Consultation des fichiers du document: {}", document.title),
            )
            .await;

        Ok(DocumentFilesDto {
            document: DocumentFolderDto {
                id: document.id,
                title: document.title,
                folder_path,
            },
            total_files: files.len() as i64,
            total_size,
            formatted_total_size: format_bytes(total_size),
            files,
        })
    }

    /// Export one document as a zip: its files plus a manifest
    pub async fn export(&self, actor: &AuthenticatedUser, id: i64) -> Result<(String, Vec<u8>)> {
        let document = self.find(id).await?;
        let export = self.prepare_export(&document).await?;
        let bytes = export_document(&export)?;

        self.logs
            .record(
                Some(actor),
                "export",
                Some("Document"),
                Some(id),
                format!("Export: {}", document.title),
            )
            .await;

        let filename = format!("document_{}_{}.zip", id, Utc::now().format("%Y%m%d_%H%M%S"));
        Ok((filename, bytes))
    }

    /// Export several documents, each in its own subfolder with its own
    /// manifest
    pub async fn export_multiple(
        &self,
        actor: &AuthenticatedUser,
        ids: &[i64],
    ) -> Result<(String, Vec<u8>)> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        if documents.is_empty() {
            return Err(AppError::NotFound(
                "Aucun document valide à exporter".to_string(),
            ));
        }

        let mut exports = Vec::with_capacity(documents.len());
        for document in &documents {
            exports.push(self.prepare_export(document).await?);
        }
        let bytes = export_documents(&exports)?;

        self.logs
            .record(
                Some(actor),
                "export_multiple",
                Some("Document"),
                None,
                format!("Export multiple: {} documents", documents.len()),
            )
            .await;

        let filename = format!("documents_export_{}.zip", Utc::now().format("%Y%m%d_%H%M%S"));
        Ok((filename, bytes))
    }

    /// Download one of a document's files
    pub async fn download_file(
        &self,
        actor: &AuthenticatedUser,
        document_id: i64,
        file_id: i64,
    ) -> Result<(File, Vec<u8>)> {
        self.find(document_id).await?;

        let file = sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE id = $1 AND document_id = $2",
        )
        .bind(file_id)
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Fichier {} introuvable", file_id)))?;

        if !self.store.exists(&file.path).await {
            return Err(AppError::NotFound(
                "Fichier non trouvé dans le stockage".to_string(),
            ));
        }
        let bytes = self.store.read(&file.path).await?;

        self.logs
            .record(
                Some(actor),
                "telechargement",
                Some("File"),
                Some(file.id),
                format!("Téléchargement: {}", file.original_name),
            )
            .await;

        Ok((file, bytes))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn find(&self, id: i64) -> Result<Document> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {} introuvable", id)))
    }

    async fn files_of(&self, document_id: i64) -> Result<Vec<File>> {
        Ok(sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE document_id = $1 ORDER BY created_at",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn ensure_category_exists(&self, category_id: i64) -> Result<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            Ok(())
        } else {
            Err(AppError::field_error(
                "category_id",
                "La catégorie sélectionnée n'existe pas",
            ))
        }
    }

    fn check_upload_sizes(&self, uploads: &[UploadedFile]) -> Result<()> {
        for upload in uploads {
            if upload.data.len() > self.max_upload_size {
                return Err(AppError::field_error(
                    "files",
                    &format!(
                        "Le fichier {} dépasse la taille maximale de {} Mo",
                        upload.original_name,
                        self.max_upload_size / 1024 / 1024
                    ),
                ));
            }
        }
        Ok(())
    }

    async fn load_relations(&self, document: Document) -> Result<DocumentResponseDto> {
        let user = sqlx::query_as::<_, UserSummaryDto>(
            "SELECT id, name, email FROM users WHERE id = $1",
        )
        .bind(document.user_id)
        .fetch_optional(&self.pool)
        .await?;

        let category = sqlx::query_as::<_, CategorySummaryDto>(
            "SELECT id, name FROM categories WHERE id = $1",
        )
        .bind(document.category_id)
        .fetch_optional(&self.pool)
        .await?;

        let files: Vec<FileResponseDto> = self
            .files_of(document.id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(DocumentResponseDto {
            id: document.id,
            title: document.title,
            content: document.content,
            etat: document.etat,
            category_id: document.category_id,
            user_id: document.user_id,
            created_at: document.created_at,
            updated_at: document.updated_at,
            user,
            category,
            files,
        })
    }

    async fn prepare_export(&self, document: &Document) -> Result<DocumentExport> {
        let user = sqlx::query_as::<_, UserSummaryDto>(
            "SELECT id, name, email FROM users WHERE id = $1",
        )
        .bind(document.user_id)
        .fetch_optional(&self.pool)
        .await?;
        let category = sqlx::query_as::<_, CategorySummaryDto>(
            "SELECT id, name FROM categories WHERE id = $1",
        )
        .bind(document.category_id)
        .fetch_optional(&self.pool)
        .await?;

        // Files missing from disk are skipped rather than failing the export
        let mut entries = Vec::new();
        for file in self.files_of(document.id).await? {
            if self.store.exists(&file.path).await {
                entries.push(ExportEntry {
                    name: file.original_name,
                    data: self.store.read(&file.path).await?,
                });
            } else {
                tracing::warn!(
                    "Skipping missing file during export: document={}, path={}",
                    document.id,
                    file.path
                );
            }
        }

        Ok(DocumentExport {
            document_id: document.id,
            manifest: DocumentManifest {
                title: document.title.clone(),
                description: document.content.clone(),
                category: category.map(|c| c.name),
                author: user.map(|u| u.name),
                created_at: document.created_at,
            },
            files: entries,
        })
    }
}

/// Folder of a stored file, derived from its relative path
fn folder_of(path: &str) -> String {
    path.rsplit_once('/')
        .map(|(folder, _)| folder.to_string())
        .unwrap_or_default()
}

/// The document folder stays stable once files exist: reuse the first
/// file's folder, otherwise derive it from the id and creation timestamp.
fn document_folder_of(document: &Document, files: &[File]) -> String {
    files
        .first()
        .map(|file| folder_of(&file.path))
        .filter(|folder| !folder.is_empty())
        .unwrap_or_else(|| FileStore::document_folder(document.id, document.created_at))
}

#[derive(sqlx::FromRow)]
struct FileWithUploaderRow {
    id: i64,
    #[allow(dead_code)]
    document_id: i64,
    original_name: String,
    path: String,
    mime_type: String,
    size: i64,
    #[allow(dead_code)]
    user_id: i64,
    created_at: chrono::DateTime<Utc>,
    #[allow(dead_code)]
    updated_at: chrono::DateTime<Utc>,
    uploader_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct DocumentListRow {
    id: i64,
    title: String,
    content: String,
    etat: String,
    category_id: i64,
    user_id: i64,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
    user_name: Option<String>,
    user_email: Option<String>,
    category_name: Option<String>,
}

impl DocumentListRow {
    fn into_dto(self, files: Vec<File>) -> DocumentResponseDto {
        let user = match (self.user_name, self.user_email) {
            (Some(name), Some(email)) => Some(UserSummaryDto {
                id: self.user_id,
                name,
                email,
            }),
            _ => None,
        };
        let category = self.category_name.map(|name| CategorySummaryDto {
            id: self.category_id,
            name,
        });
        DocumentResponseDto {
            id: self.id,
            title: self.title,
            content: self.content,
            etat: self.etat,
            category_id: self.category_id,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            user,
            category,
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

fn push_filters(query: &mut QueryBuilder<Postgres>, filter: &DocumentFilterQuery, etat: Etat) {
    query.push(" AND d.etat = ");
    query.push_bind(etat.as_str());

    if let Some(q) = &filter.q {
        let pattern = format!("%{}%", q);
        query.push(" AND (d.title ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR d.content ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR u.name ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
    if let Some(category_id) = filter.category_id {
        query.push(" AND d.category_id = ");
        query.push_bind(category_id);
    }
    if let Some(user_id) = filter.user_id {
        query.push(" AND d.user_id = ");
        query.push_bind(user_id);
    }
    if let Some(from) = filter.from {
        query.push(" AND d.created_at::date >= ");
        query.push_bind(from);
    }
    if let Some(to) = filter.to {
        query.push(" AND d.created_at::date <= ");
        query.push_bind(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn document() -> Document {
        Document {
            id: 9,
            title: "Jugement".to_string(),
            content: String::new(),
            etat: "actif".to_string(),
            category_id: 1,
            user_id: 1,
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 5).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 5).unwrap(),
        }
    }

    fn file_at(path: &str) -> File {
        File {
            id: 1,
            document_id: 9,
            original_name: "a.pdf".to_string(),
            path: path.to_string(),
            mime_type: "application/pdf".to_string(),
            size: 3,
            user_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn folder_is_reused_from_the_first_file() {
        let files = vec![file_at("documents/document_9_2024-01-01_00-00-00/a.pdf")];
        assert_eq!(
            document_folder_of(&document(), &files),
            "documents/document_9_2024-01-01_00-00-00"
        );
    }

    #[test]
    fn folder_is_derived_when_no_file_exists() {
        assert_eq!(
            document_folder_of(&document(), &[]),
            "documents/document_9_2024-03-15_09-30-05"
        );
    }
}
