use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerativeServiceError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("IO error: {0}")]
    IoError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUploadRequest {
    pub name: String,
    pub display_name: String,
    pub mime_type: String,
}

/// Handle for a file held by the generative service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
}

impl RemoteFile {
    /// The URI, if the service returned a non-blank one.
    pub fn usable_uri(&self) -> Option<&str> {
        self.uri.as_deref().filter(|uri| !uri.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    FileData { mime_type: String, file_uri: String },
    Text(String),
}

#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload_file(
        &self,
        local_path: &Path,
        request: FileUploadRequest,
    ) -> Result<RemoteFile, GenerativeServiceError>;
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Returns the model's raw text answer.
    async fn generate_content(
        &self,
        parts: Vec<ContentPart>,
    ) -> Result<String, GenerativeServiceError>;
}
