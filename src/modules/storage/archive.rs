//! Zip export of archived documents
//!
//! Builds the archive fully in memory: every file of a document under its
//! original name, plus a `description.txt` manifest. Batch exports place
//! each document in its own `document_{id}/` subfolder with its own
//! manifest.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::core::error::{AppError, Result};
use crate::shared::validation::split_filename;

/// Manifest file added to every exported document
pub const MANIFEST_NAME: &str = "description.txt";

/// A file to include in an export
#[derive(Debug, Clone)]
pub struct ExportEntry {
    /// Name inside the archive (the file's original name)
    pub name: String,
    pub data: Vec<u8>,
}

/// Summary written to the manifest of an exported document
#[derive(Debug, Clone)]
pub struct DocumentManifest {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DocumentManifest {
    pub fn to_text(&self) -> String {
        let mut text = format!("Titre: {}\n", self.title);
        text.push_str(&format!("Description: {}\n", self.description));
        text.push_str(&format!(
            "Catégorie: {}\n",
            self.category.as_deref().unwrap_or("Non définie")
        ));
        text.push_str(&format!(
            "Auteur: {}\n",
            self.author.as_deref().unwrap_or("Inconnu")
        ));
        text.push_str(&format!("Date: {}\n", self.created_at.format("%Y-%m-%d %H:%M:%S")));
        text
    }
}

/// A document prepared for export
#[derive(Debug, Clone)]
pub struct DocumentExport {
    pub document_id: i64,
    pub manifest: DocumentManifest,
    pub files: Vec<ExportEntry>,
}

/// Build a zip with one document's files at the archive root plus its
/// manifest.
pub fn export_document(export: &DocumentExport) -> Result<Vec<u8>> {
    let mut builder = ArchiveBuilder::new();
    builder.add_document("", export)?;
    builder.finish()
}

/// Build a zip with each document under `document_{id}/`, each with its own
/// manifest.
pub fn export_documents(exports: &[DocumentExport]) -> Result<Vec<u8>> {
    let mut builder = ArchiveBuilder::new();
    for export in exports {
        let prefix = format!("document_{}/", export.document_id);
        builder.add_document(&prefix, export)?;
    }
    builder.finish()
}

struct ArchiveBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    used_names: HashSet<String>,
}

impl ArchiveBuilder {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            used_names: HashSet::new(),
        }
    }

    fn add_document(&mut self, prefix: &str, export: &DocumentExport) -> Result<()> {
        for file in &export.files {
            let name = self.unique_name(prefix, &file.name);
            self.add_entry(&name, &file.data)?;
        }
        let manifest_name = format!("{}{}", prefix, MANIFEST_NAME);
        self.add_entry(&manifest_name, export.manifest.to_text().as_bytes())
    }

    fn add_entry(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip
            .start_file(name, options)
            .map_err(|e| AppError::Storage(format!("Failed to add '{}' to archive: {}", name, e)))?;
        self.zip
            .write_all(data)
            .map_err(|e| AppError::Storage(format!("Failed to write '{}' to archive: {}", name, e)))?;
        self.used_names.insert(name.to_string());
        Ok(())
    }

    /// Two files of one document can share an original name; suffix the
    /// archive entry the same way the file store suffixes stored names.
    fn unique_name(&self, prefix: &str, original: &str) -> String {
        let candidate = format!("{}{}", prefix, original);
        if !self.used_names.contains(&candidate) {
            return candidate;
        }
        let (stem, extension) = split_filename(original);
        let mut counter = 1u32;
        loop {
            let name = match extension {
                Some(ext) => format!("{}{}_({}).{}", prefix, stem, counter, ext),
                None => format!("{}{}_({})", prefix, stem, counter),
            };
            if !self.used_names.contains(&name) {
                return name;
            }
            counter += 1;
        }
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| AppError::Storage(format!("Failed to finalize archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Read;
    use zip::read::ZipArchive;

    fn manifest(title: &str) -> DocumentManifest {
        DocumentManifest {
            title: title.to_string(),
            description: "Pièces du dossier".to_string(),
            category: Some("Affaires Civiles".to_string()),
            author: Some("Greffier".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 2, 14, 0, 0).unwrap(),
        }
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn single_export_contains_files_and_manifest() {
        let export = DocumentExport {
            document_id: 7,
            manifest: manifest("Jugement n°7"),
            files: vec![
                ExportEntry {
                    name: "jugement.pdf".to_string(),
                    data: b"PDF".to_vec(),
                },
                ExportEntry {
                    name: "annexe.txt".to_string(),
                    data: b"annexe".to_vec(),
                },
            ],
        };

        let bytes = export_document(&export).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.len(), 3);
        let manifest_text = read_entry(&mut archive, MANIFEST_NAME);
        assert!(manifest_text.contains("Titre: Jugement n°7"));
        assert!(manifest_text.contains("Catégorie: Affaires Civiles"));
        assert!(manifest_text.contains("Auteur: Greffier"));
        assert_eq!(read_entry(&mut archive, "annexe.txt"), "annexe");
    }

    #[test]
    fn batch_export_uses_one_subfolder_per_document() {
        let exports = vec![
            DocumentExport {
                document_id: 1,
                manifest: manifest("Premier"),
                files: vec![ExportEntry {
                    name: "a.txt".to_string(),
                    data: b"a".to_vec(),
                }],
            },
            DocumentExport {
                document_id: 2,
                manifest: manifest("Second"),
                files: vec![],
            },
        ];

        let bytes = export_documents(&exports).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(read_entry(&mut archive, "document_1/a.txt"), "a");
        assert!(read_entry(&mut archive, "document_1/description.txt").contains("Titre: Premier"));
        assert!(read_entry(&mut archive, "document_2/description.txt").contains("Titre: Second"));
    }

    #[test]
    fn duplicate_names_are_suffixed_inside_the_archive() {
        let export = DocumentExport {
            document_id: 3,
            manifest: manifest("Doublons"),
            files: vec![
                ExportEntry {
                    name: "piece.pdf".to_string(),
                    data: b"un".to_vec(),
                },
                ExportEntry {
                    name: "piece.pdf".to_string(),
                    data: b"deux".to_vec(),
                },
            ],
        };

        let bytes = export_document(&export).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(read_entry(&mut archive, "piece.pdf"), "un");
        assert_eq!(read_entry(&mut archive, "piece_(1).pdf"), "deux");
    }

    #[test]
    fn missing_relations_fall_back_in_manifest() {
        let text = DocumentManifest {
            title: "Sans relations".to_string(),
            description: String::new(),
            category: None,
            author: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
        .to_text();
        assert!(text.contains("Catégorie: Non définie"));
        assert!(text.contains("Auteur: Inconnu"));
    }
}
