use std::sync::Arc;
use thiserror::Error;

use crate::application::ports::{
    ContentGenerator, FileStorage, FileUploader, SpreadsheetConverter,
    file_storage::FileStorageError,
    generative_model::FileUploadRequest,
    spreadsheet_converter::SpreadsheetConversionError,
};
use crate::application::services::{ModelResponseError, build_request_parts, parse_model_response};
use crate::domain::entities::{ExtractionOutput, UploadedFile};
use crate::domain::value_objects::NormalizedPayload;

pub const UPLOAD_FAILURE_MESSAGE: &str = "Failed to upload file to Google AI FileManager.";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No file uploaded.")]
    MissingInput,
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
    #[error("Failed to extract data from the Excel file.")]
    ExtractionFailure,
    #[error("Error extracting text from Excel: {0}")]
    ConversionFailure(String),
    #[error("Error extracting text from Excel: No sheets found in the Excel file.")]
    NoSheetsFound,
    #[error("{0}")]
    UploadFailure(String),
    #[error("Failed to generate content: {0}")]
    GenerationFailure(String),
    #[error("{0}")]
    MalformedModelResponse(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Processing task failed: {0}")]
    Interrupted(String),
}

impl IngestError {
    pub fn upload_failure(detail: Option<String>) -> Self {
        match detail {
            Some(detail) => {
                IngestError::UploadFailure(format!("{} {}", UPLOAD_FAILURE_MESSAGE, detail))
            }
            None => IngestError::UploadFailure(UPLOAD_FAILURE_MESSAGE.to_string()),
        }
    }

    /// Problems with the request itself, as opposed to processing failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, IngestError::MissingInput | IngestError::InvalidUpload(_))
    }
}

impl From<SpreadsheetConversionError> for IngestError {
    fn from(error: SpreadsheetConversionError) -> Self {
        match error {
            SpreadsheetConversionError::NoSheetsFound => IngestError::NoSheetsFound,
            SpreadsheetConversionError::ConversionFailure(msg) => {
                IngestError::ConversionFailure(msg)
            }
        }
    }
}

impl From<FileStorageError> for IngestError {
    fn from(error: FileStorageError) -> Self {
        IngestError::Storage(error.to_string())
    }
}

impl From<ModelResponseError> for IngestError {
    fn from(error: ModelResponseError) -> Self {
        IngestError::MalformedModelResponse(error.to_string())
    }
}

/// Upload → optional spreadsheet conversion → remote upload → generation →
/// JSON extraction. Holds no per-request state, so one instance serves every
/// request.
pub struct IngestDocumentUseCase {
    file_storage: Arc<dyn FileStorage>,
    spreadsheet_converter: Arc<dyn SpreadsheetConverter>,
    file_uploader: Arc<dyn FileUploader>,
    content_generator: Arc<dyn ContentGenerator>,
}

impl IngestDocumentUseCase {
    pub fn new(
        file_storage: Arc<dyn FileStorage>,
        spreadsheet_converter: Arc<dyn SpreadsheetConverter>,
        file_uploader: Arc<dyn FileUploader>,
        content_generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        Self {
            file_storage,
            spreadsheet_converter,
            file_uploader,
            content_generator,
        }
    }

    /// Runs the pipeline for one stored upload. The upload, and any converted
    /// copy of it, is deleted before this returns, whatever the outcome.
    /// Cleanup only happens if the future is driven to completion; callers
    /// that can be cancelled run it on a spawned task.
    pub async fn execute(&self, file: UploadedFile) -> Result<ExtractionOutput, IngestError> {
        tracing::info!(
            "Ingesting {} ({}, {} bytes, kind {})",
            file.original_name(),
            file.mime_type(),
            file.size(),
            file.kind()
        );

        let payload = match self.normalize(&file).await {
            Ok(payload) => payload,
            Err(e) => {
                self.cleanup(&file, None).await;
                return Err(e);
            }
        };

        let result = self.extract(&file, &payload).await;
        self.cleanup(&file, Some(&payload)).await;

        result
    }

    async fn normalize(&self, file: &UploadedFile) -> Result<NormalizedPayload, IngestError> {
        if !file.kind().needs_conversion() {
            return Ok(NormalizedPayload::pass_through(
                file.mime_type(),
                file.storage_path(),
            ));
        }

        tracing::info!("Processing Excel file {}", file.original_name());

        let converter = self.spreadsheet_converter.clone();
        let path = file.storage_path().to_path_buf();
        let text = tokio::task::spawn_blocking(move || converter.convert_to_text(&path))
            .await
            .map_err(|e| IngestError::ConversionFailure(e.to_string()))??;

        if text.is_empty() {
            return Err(IngestError::ExtractionFailure);
        }

        let stored = self.file_storage.store_text(&text).await?;
        tracing::debug!(
            "Wrote {} bytes of spreadsheet text to {}",
            stored.size,
            stored.path.display()
        );

        Ok(NormalizedPayload::converted_text(stored.path))
    }

    async fn extract(
        &self,
        file: &UploadedFile,
        payload: &NormalizedPayload,
    ) -> Result<ExtractionOutput, IngestError> {
        let request = FileUploadRequest {
            name: file.storage_name(),
            display_name: file.original_name().to_string(),
            mime_type: payload.mime_type().to_string(),
        };

        let remote_file = self
            .file_uploader
            .upload_file(payload.source_path(), request)
            .await
            .map_err(|e| IngestError::upload_failure(Some(e.to_string())))?;

        let file_uri = remote_file
            .usable_uri()
            .ok_or_else(|| IngestError::upload_failure(None))?;

        tracing::info!(
            "Uploaded {} as {} ({})",
            file.original_name(),
            remote_file.name.as_deref().unwrap_or("unnamed"),
            file_uri
        );

        let parts = build_request_parts(payload.mime_type(), file_uri);
        let response_text = self
            .content_generator
            .generate_content(parts)
            .await
            .map_err(|e| IngestError::GenerationFailure(e.to_string()))?;

        tracing::debug!("Raw AI response: {}", response_text);

        let output = parse_model_response(&response_text)?;
        if output.is_empty() {
            tracing::warn!("Model returned no records for {}", file.original_name());
        }
        tracing::info!(
            "Extracted {} record(s) from {}",
            output.len(),
            file.original_name()
        );

        Ok(output)
    }

    async fn cleanup(&self, file: &UploadedFile, payload: Option<&NormalizedPayload>) {
        let mut paths = vec![file.storage_path()];
        if let Some(payload) = payload.filter(|p| p.is_converted()) {
            paths.push(payload.source_path());
        }

        for path in paths {
            match self.file_storage.delete_file(path).await {
                Ok(true) => tracing::debug!("Deleted temporary file {}", path.display()),
                Ok(false) => tracing::warn!("Temporary file {} was already gone", path.display()),
                Err(e) => tracing::error!("Error deleting file {}: {}", path.display(), e),
            }
        }
    }
}
