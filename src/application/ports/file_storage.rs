use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for FileStorageError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => FileStorageError::FileNotFound(error.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                FileStorageError::PermissionDenied(error.to_string())
            }
            _ => FileStorageError::IoError(error.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Scratch storage for request-scoped files. Every stored file gets a fresh
/// unique name, so concurrent requests never share a path.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store_file(&self, data: &[u8]) -> Result<StoredFile, FileStorageError>;

    async fn store_text(&self, text: &str) -> Result<StoredFile, FileStorageError>;

    /// Returns `Ok(false)` when there was nothing to delete.
    async fn delete_file(&self, path: &Path) -> Result<bool, FileStorageError>;
}
