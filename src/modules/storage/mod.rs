//! Storage module for file management
//!
//! Local filesystem placement of uploaded files (one folder per document)
//! and zip export of documents with their manifests.

pub mod archive;
mod file_store;

pub use file_store::{FileStore, StoredFile};
