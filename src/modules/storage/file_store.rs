//! Local filesystem store for uploaded files
//!
//! Every document owns one folder under the storage root
//! (`documents/document_{id}_{timestamp}`). Files keep their original names;
//! a counter suffix is appended when a name is already taken, so nothing is
//! ever overwritten. Writes go through a staging area and are renamed into
//! place, which keeps individual files atomic even though the filesystem is
//! not covered by the database transaction.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::validation::{sanitize_filename, split_filename};

/// Subdirectory of the storage root holding per-document folders
const DOCUMENTS_DIR: &str = "documents";

/// Subdirectory of the storage root used for in-flight writes
const STAGING_DIR: &str = "staging";

/// A file placed under the storage root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name the file ended up with inside its document folder
    pub final_name: String,
    /// Path relative to the storage root, recorded in the database
    pub relative_path: String,
    /// Size on disk in bytes
    pub size: i64,
}

/// Local filesystem store rooted at `StorageConfig::root`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create the root and staging directories if they are missing
    pub async fn ensure_layout(&self) -> Result<()> {
        fs::create_dir_all(self.root.join(DOCUMENTS_DIR))
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create storage root: {}", e)))?;
        fs::create_dir_all(self.root.join(STAGING_DIR))
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create staging dir: {}", e)))?;
        Ok(())
    }

    /// Folder name for a document, deterministic from its id and creation
    /// timestamp: `documents/document_{id}_{Y-m-d_H-M-S}`
    pub fn document_folder(document_id: i64, created_at: DateTime<Utc>) -> String {
        format!(
            "{}/document_{}_{}",
            DOCUMENTS_DIR,
            document_id,
            created_at.format("%Y-%m-%d_%H-%M-%S")
        )
    }

    /// Absolute path for a relative path recorded in the database
    pub fn absolute(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }

    /// Whether a stored file is still present on disk
    pub async fn exists(&self, relative_path: &str) -> bool {
        fs::try_exists(self.absolute(relative_path))
            .await
            .unwrap_or(false)
    }

    /// Store an uploaded file inside a document folder.
    ///
    /// The folder is created lazily on first use. When `original_name` is
    /// already taken the stored name becomes `name_(1).ext`, `name_(2).ext`, …
    /// The data is first written to the staging area and renamed into place.
    pub async fn store(
        &self,
        folder: &str,
        original_name: &str,
        data: &[u8],
    ) -> Result<StoredFile> {
        let folder_path = self.root.join(folder);
        fs::create_dir_all(&folder_path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create document folder: {}", e)))?;

        let safe_name = sanitize_filename(original_name);
        let final_name = self.available_name(&folder_path, &safe_name).await?;
        let target = folder_path.join(&final_name);

        // Stage first; rename is atomic on the same filesystem
        let staging = self
            .root
            .join(STAGING_DIR)
            .join(format!("{}_{}", Uuid::new_v4(), final_name));
        if let Some(parent) = staging.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create staging dir: {}", e)))?;
        }
        fs::write(&staging, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write staged file: {}", e)))?;
        fs::rename(&staging, &target).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to move staged file into {}: {}",
                folder, e
            ))
        })?;

        Ok(StoredFile {
            relative_path: format!("{}/{}", folder, final_name),
            final_name,
            size: data.len() as i64,
        })
    }

    /// Read a stored file fully into memory (downloads and exports)
    pub async fn read(&self, relative_path: &str) -> Result<Vec<u8>> {
        fs::read(self.absolute(relative_path)).await.map_err(|e| {
            AppError::Storage(format!("Failed to read file {}: {}", relative_path, e))
        })
    }

    /// Physically delete a stored file. The document folder persists even
    /// when emptied.
    pub async fn remove(&self, relative_path: &str) -> Result<()> {
        let path = self.absolute(relative_path);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone: the database row is authoritative, nothing to do
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete file {}: {}",
                relative_path, e
            ))),
        }
    }

    /// First free name for `safe_name` within `folder_path`:
    /// `name.ext`, then `name_(1).ext`, `name_(2).ext`, …
    async fn available_name(&self, folder_path: &Path, safe_name: &str) -> Result<String> {
        if !path_taken(&folder_path.join(safe_name)).await {
            return Ok(safe_name.to_string());
        }

        let (stem, extension) = split_filename(safe_name);
        let mut counter = 1u32;
        loop {
            let candidate = match extension {
                Some(ext) => format!("{}_({}).{}", stem, counter, ext),
                None => format!("{}_({})", stem, counter),
            };
            if !path_taken(&folder_path.join(&candidate)).await {
                return Ok(candidate);
            }
            counter += 1;
        }
    }
}

async fn path_taken(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn document_folder_is_deterministic() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 5).unwrap();
        assert_eq!(
            FileStore::document_folder(12, created_at),
            "documents/document_12_2024-03-15_09-30-05"
        );
        // Same inputs, same folder
        assert_eq!(
            FileStore::document_folder(12, created_at),
            FileStore::document_folder(12, created_at)
        );
    }

    #[tokio::test]
    async fn store_keeps_original_name_when_free() {
        let (_dir, store) = store();
        store.ensure_layout().await.unwrap();

        let stored = store
            .store("documents/document_1_x", "jugement.pdf", b"contenu")
            .await
            .unwrap();

        assert_eq!(stored.final_name, "jugement.pdf");
        assert_eq!(stored.relative_path, "documents/document_1_x/jugement.pdf");
        assert_eq!(stored.size, 7);
        assert_eq!(store.read(&stored.relative_path).await.unwrap(), b"contenu");
    }

    #[tokio::test]
    async fn duplicate_names_get_counter_suffixes() {
        let (_dir, store) = store();
        store.ensure_layout().await.unwrap();
        let folder = "documents/document_2_x";

        let first = store.store(folder, "annexe.pdf", b"premier").await.unwrap();
        let second = store.store(folder, "annexe.pdf", b"second").await.unwrap();
        let third = store.store(folder, "annexe.pdf", b"troisieme").await.unwrap();

        assert_eq!(first.final_name, "annexe.pdf");
        assert_eq!(second.final_name, "annexe_(1).pdf");
        assert_eq!(third.final_name, "annexe_(2).pdf");

        // No write clobbered an earlier one
        assert_eq!(store.read(&first.relative_path).await.unwrap(), b"premier");
        assert_eq!(store.read(&second.relative_path).await.unwrap(), b"second");
        assert_eq!(store.read(&third.relative_path).await.unwrap(), b"troisieme");
    }

    #[tokio::test]
    async fn duplicate_names_without_extension() {
        let (_dir, store) = store();
        store.ensure_layout().await.unwrap();
        let folder = "documents/document_3_x";

        store.store(folder, "LISEZMOI", b"a").await.unwrap();
        let second = store.store(folder, "LISEZMOI", b"b").await.unwrap();
        assert_eq!(second.final_name, "LISEZMOI_(1)");
    }

    #[tokio::test]
    async fn hostile_filenames_cannot_escape_the_folder() {
        let (_dir, store) = store();
        store.ensure_layout().await.unwrap();

        let stored = store
            .store("documents/document_4_x", "../../../etc/passwd", b"x")
            .await
            .unwrap();
        assert_eq!(stored.final_name, "passwd");
        assert!(stored.relative_path.starts_with("documents/document_4_x/"));
    }

    #[tokio::test]
    async fn staging_leaves_no_leftovers() {
        let (dir, store) = store();
        store.ensure_layout().await.unwrap();

        store
            .store("documents/document_5_x", "note.txt", b"n")
            .await
            .unwrap();

        let mut staging = tokio::fs::read_dir(dir.path().join("staging")).await.unwrap();
        assert!(staging.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_deletes_file_but_keeps_folder() {
        let (dir, store) = store();
        store.ensure_layout().await.unwrap();
        let folder = "documents/document_6_x";

        let stored = store.store(folder, "scan.png", b"img").await.unwrap();
        store.remove(&stored.relative_path).await.unwrap();

        assert!(!store.exists(&stored.relative_path).await);
        assert!(dir.path().join(folder).is_dir());

        // Removing twice is not an error
        store.remove(&stored.relative_path).await.unwrap();
    }
}
