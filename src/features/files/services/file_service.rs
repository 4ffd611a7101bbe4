use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::DocumentSummaryDto;
use crate::features::files::dtos::{FileFilterQuery, FileResponseDto, FileWithDocumentDto};
use crate::features::files::models::File;
use crate::features::logs::LogService;
use crate::modules::storage::FileStore;
use crate::shared::types::PaginationQuery;

/// Service for archive-wide file operations
pub struct FileService {
    pool: PgPool,
    store: FileStore,
    logs: Arc<LogService>,
}

impl FileService {
    pub fn new(pool: PgPool, store: FileStore, logs: Arc<LogService>) -> Self {
        Self { pool, store, logs }
    }

    /// List files across documents, newest first
    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        filter: &FileFilterQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<FileResponseDto>, i64)> {
        let mut count_query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM files f JOIN documents d ON d.id = f.document_id WHERE 1=1",
        );
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT f.*
            FROM files f
            JOIN documents d ON d.id = f.document_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut query, filter);
        query.push(" ORDER BY f.created_at DESC LIMIT ");
        query.push_bind(pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(pagination.offset());

        let files = query.build_query_as::<File>().fetch_all(&self.pool).await?;

        self.logs
            .record(
                Some(actor),
                "consultation_liste",
                Some("File"),
                None,
                "Consultation de la liste des fichiers",
            )
            .await;

        Ok((files.into_iter().map(Into::into).collect(), total))
    }

    /// Fetch a file with its owning document
    pub async fn get(&self, actor: &AuthenticatedUser, id: i64) -> Result<FileWithDocumentDto> {
        let file = self.find(id).await?;

        let document = sqlx::query_as::<_, DocumentSummaryDto>(
            "SELECT id, title, etat, created_at FROM documents WHERE id = $1",
        )
        .bind(file.document_id)
        .fetch_optional(&self.pool)
        .await?;

        self.logs
            .record(
                Some(actor),
                "consultation",
                Some("File"),
                Some(id),
                "Consultation d'un fichier",
            )
            .await;

        Ok(FileWithDocumentDto {
            file: file.into(),
            document,
        })
    }

    /// Read a file's bytes for download
    pub async fn download(&self, actor: &AuthenticatedUser, id: i64) -> Result<(File, Vec<u8>)> {
        let file = self.find(id).await?;

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
                Some(id),
                format!("Téléchargement: {}", file.original_name),
            )
            .await;

        Ok((file, bytes))
    }

    /// Explicit delete path: the database row and the physical file go
    /// together. The document folder persists.
    pub async fn delete(&self, actor: &AuthenticatedUser, id: i64) -> Result<()> {
        let file = self.find(id).await?;

        self.store.remove(&file.path).await?;
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.logs
            .record(
                Some(actor),
                "suppression",
                Some("File"),
                Some(id),
                format!("Suppression du fichier: {}", file.original_name),
            )
            .await;

        Ok(())
    }

    async fn find(&self, id: i64) -> Result<File> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fichier {} introuvable", id)))
    }
}

fn push_filters(query: &mut QueryBuilder<Postgres>, filter: &FileFilterQuery) {
    if let Some(q) = &filter.q {
        query.push(" AND f.original_name ILIKE ");
        query.push_bind(format!("%{}%", q));
    }
    if let Some(category_id) = filter.category_id {
        query.push(" AND d.category_id = ");
        query.push_bind(category_id);
    }
    if let Some(document_id) = filter.document_id {
        query.push(" AND f.document_id = ");
        query.push_bind(document_id);
    }
}
