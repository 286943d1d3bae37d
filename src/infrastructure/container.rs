use std::sync::Arc;

use crate::{
    application::{
        ports::{ContentGenerator, FileStorage, FileUploader, SpreadsheetConverter},
        use_cases::IngestDocumentUseCase,
    },
    infrastructure::{
        config::AppConfig, document_converters::CalamineSpreadsheetConverter,
        external_services::GeminiClient, file_system::LocalFileStorage,
    },
    presentation::http::handlers::UploadHandler,
};

/// Everything is built once at start-up and shared by all requests.
pub struct AppContainer {
    pub config: AppConfig,

    // HTTP Handlers
    pub upload_handler: Arc<UploadHandler>,
}

impl AppContainer {
    pub async fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let local_storage = LocalFileStorage::new(config.upload_dir.clone());
        local_storage
            .ensure_directory_exists()
            .await
            .map_err(|e| format!("Failed to create upload directory: {}", e))?;
        let file_storage: Arc<dyn FileStorage> = Arc::new(local_storage);

        let spreadsheet_converter: Arc<dyn SpreadsheetConverter> =
            Arc::new(CalamineSpreadsheetConverter::new());

        let gemini_client = Arc::new(
            GeminiClient::new(config.gemini_client_config())
                .map_err(|e| format!("Failed to create Gemini client: {}", e))?,
        );
        tracing::info!("Using Gemini model {}", gemini_client.model());
        let file_uploader: Arc<dyn FileUploader> = gemini_client.clone();
        let content_generator: Arc<dyn ContentGenerator> = gemini_client;

        let ingest_document_use_case = Arc::new(IngestDocumentUseCase::new(
            file_storage.clone(),
            spreadsheet_converter,
            file_uploader,
            content_generator,
        ));

        let upload_handler = Arc::new(UploadHandler::new(ingest_document_use_case, file_storage));

        Ok(Self {
            config,
            upload_handler,
        })
    }
}
