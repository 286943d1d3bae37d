use std::path::{Path, PathBuf};

use crate::domain::value_objects::DocumentKind;

/// One incoming file, already written to temporary storage by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    original_name: String,
    mime_type: String,
    storage_path: PathBuf,
    size: u64,
}

impl UploadedFile {
    pub fn new(
        original_name: String,
        mime_type: String,
        storage_path: PathBuf,
        size: u64,
    ) -> Self {
        Self {
            original_name,
            mime_type,
            storage_path,
            size,
        }
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Server-assigned file name, the last component of the storage path.
    pub fn storage_name(&self) -> String {
        self.storage_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_mime_type(&self.mime_type)
    }
}
