use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::ports::FileStorage;
use crate::application::use_cases::{IngestDocumentUseCase, IngestError};
use crate::domain::entities::{ExtractionOutput, UploadedFile};
use crate::domain::value_objects::document_kind::DEFAULT_MIME_TYPE;

/// Multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

struct ReceivedFile {
    file_name: String,
    mime_type: String,
    data: Bytes,
}

pub struct UploadHandler {
    ingest_use_case: Arc<IngestDocumentUseCase>,
    file_storage: Arc<dyn FileStorage>,
}

impl UploadHandler {
    pub fn new(
        ingest_use_case: Arc<IngestDocumentUseCase>,
        file_storage: Arc<dyn FileStorage>,
    ) -> Self {
        Self {
            ingest_use_case,
            file_storage,
        }
    }

    pub async fn upload_file(
        State(handler): State<Arc<UploadHandler>>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<impl IntoResponse, IngestError> {
        let mut multipart = multipart.map_err(|e| {
            tracing::warn!("Upload request is not multipart: {}", e);
            IngestError::MissingInput
        })?;

        let received = Self::receive_file(&mut multipart)
            .await?
            .ok_or(IngestError::MissingInput)?;

        // Once anything is on disk the work runs on its own task, so a client
        // hanging up cannot drop the request before its temp files are removed.
        let result = tokio::spawn(async move { handler.process(received).await })
            .await
            .map_err(|e| IngestError::Interrupted(e.to_string()))?;

        match result {
            Ok(output) => Ok((StatusCode::OK, Json(output))),
            Err(e) => {
                tracing::error!("Error processing file: {}", e);
                Err(e)
            }
        }
    }

    async fn process(&self, received: ReceivedFile) -> Result<ExtractionOutput, IngestError> {
        let stored = self.file_storage.store_file(&received.data).await?;
        let uploaded = UploadedFile::new(
            received.file_name,
            received.mime_type,
            stored.path,
            stored.size,
        );

        self.ingest_use_case.execute(uploaded).await
    }

    /// Reads the first `file` part that carries a filename. Other parts are
    /// skipped.
    async fn receive_file(multipart: &mut Multipart) -> Result<Option<ReceivedFile>, IngestError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| IngestError::InvalidUpload(e.body_text()))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let file_name = match field.file_name() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => continue,
            };

            let mime_type = field
                .content_type()
                .map(|ct| ct.to_string())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| IngestError::InvalidUpload(e.body_text()))?;

            return Ok(Some(ReceivedFile {
                file_name,
                mime_type,
                data,
            }));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use crate::application::ports::generative_model::{
        ContentPart, FileUploadRequest, GenerativeServiceError, RemoteFile,
    };
    use crate::application::ports::{ContentGenerator, FileUploader};
    use crate::domain::value_objects::document_kind::{PLAIN_TEXT_MIME_TYPE, XLSX_MIME_TYPE};
    use crate::infrastructure::document_converters::CalamineSpreadsheetConverter;
    use crate::infrastructure::document_converters::spreadsheet_converter::fixtures::{
        inline_cell, minimal_xlsx, sheet_xml,
    };
    use crate::infrastructure::file_system::LocalFileStorage;
    use crate::presentation::http::server::build_router;

    const BOUNDARY: &str = "X-INVOICE-BOUNDARY";

    struct StubModel {
        reply: String,
        uploads: AtomicUsize,
        uploaded: Mutex<Vec<(String, Vec<u8>)>>,
        generations: AtomicUsize,
        // When set, generation waits until the test releases it.
        gate: Option<Notify>,
    }

    impl StubModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                uploads: AtomicUsize::new(0),
                uploaded: Mutex::new(Vec::new()),
                generations: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn gated(reply: &str) -> Self {
            Self {
                gate: Some(Notify::new()),
                ..Self::replying(reply)
            }
        }
    }

    #[async_trait]
    impl FileUploader for StubModel {
        async fn upload_file(
            &self,
            local_path: &Path,
            request: FileUploadRequest,
        ) -> Result<RemoteFile, GenerativeServiceError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            let contents = std::fs::read(local_path)
                .map_err(|e| GenerativeServiceError::IoError(e.to_string()))?;
            self.uploaded
                .lock()
                .unwrap()
                .push((request.mime_type.clone(), contents));
            Ok(RemoteFile {
                name: Some(format!("files/{}", request.name)),
                uri: Some("https://files.example/1".to_string()),
                mime_type: Some(request.mime_type),
            })
        }
    }

    #[async_trait]
    impl ContentGenerator for StubModel {
        async fn generate_content(
            &self,
            _parts: Vec<ContentPart>,
        ) -> Result<String, GenerativeServiceError> {
            self.generations.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(self.reply.clone())
        }
    }

    fn app(reply: &str) -> (TempDir, Arc<StubModel>, axum::Router) {
        app_with(StubModel::replying(reply))
    }

    fn app_with(model: StubModel) -> (TempDir, Arc<StubModel>, axum::Router) {
        let dir = TempDir::new().unwrap();
        let storage: Arc<dyn FileStorage> =
            Arc::new(LocalFileStorage::new(dir.path().to_path_buf()));
        let model = Arc::new(model);
        let use_case = Arc::new(IngestDocumentUseCase::new(
            storage.clone(),
            Arc::new(CalamineSpreadsheetConverter::new()),
            model.clone(),
            model.clone(),
        ));
        let handler = Arc::new(UploadHandler::new(use_case, storage));

        (dir, model, build_router(handler, 1024 * 1024))
    }

    fn multipart_body(field: &str, file_name: Option<&str>, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut disposition = format!("form-data; name=\"{}\"", field);
        if let Some(file_name) = file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }

        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn dir_is_empty(dir: &TempDir) -> bool {
        std::fs::read_dir(dir.path()).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_upload_returns_extracted_json() {
        let (dir, model, app) = app("```json\n{\"SerialNumber\": \"1\"}\n```");
        let body = multipart_body("file", Some("invoice.pdf"), "application/pdf", b"%PDF-1.4");

        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, serde_json::json!({ "SerialNumber": "1" }));
        assert_eq!(model.uploads.load(Ordering::SeqCst), 1);
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_missing_file_field_is_bad_request() {
        let (dir, model, app) = app("unused");
        let body = multipart_body("attachment", Some("invoice.pdf"), "application/pdf", b"%PDF");

        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "No file uploaded.");
        assert_eq!(model.uploads.load(Ordering::SeqCst), 0);
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_file_field_without_filename_is_bad_request() {
        let (dir, _model, app) = app("unused");
        let body = multipart_body("file", None, "text/plain", b"just a value");

        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "No file uploaded.");
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_non_multipart_request_is_bad_request() {
        let (_dir, _model, app) = app("unused");
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "No file uploaded.");
    }

    #[tokio::test]
    async fn test_model_reply_without_json_is_server_error() {
        let (dir, _model, app) = app("I could not read that document.");
        let body = multipart_body("file", Some("scan.png"), "image/png", &[0x89, b'P', b'N', b'G']);

        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "JSON not found in the AI response.");
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_unreadable_spreadsheet_is_server_error() {
        let (dir, model, app) = app("unused");
        let body = multipart_body(
            "file",
            Some("broken.xlsx"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            b"definitely not a zip archive",
        );

        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            body_text(response)
                .await
                .starts_with("Error extracting text from Excel:")
        );
        assert_eq!(model.uploads.load(Ordering::SeqCst), 0);
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_spreadsheet_upload_reaches_model_as_text() {
        let (dir, model, app) = app("```json\n[{\"ProductName\": \"Bolt\"}]\n```");
        let sheet = sheet_xml(&[
            vec![inline_cell("A1", "Product"), inline_cell("B1", "Qty")],
            vec![inline_cell("A2", "Bolt"), inline_cell("B2", "4")],
        ]);
        let workbook = minimal_xlsx(&[("Invoices", sheet)]);
        let body = multipart_body("file", Some("sales.xlsx"), XLSX_MIME_TYPE, &workbook);

        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, serde_json::json!([{ "ProductName": "Bolt" }]));

        let uploaded = model.uploaded.lock().unwrap().clone();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(uploaded[0].0, PLAIN_TEXT_MIME_TYPE);
        assert_eq!(uploaded[0].1, b"Product\tQty\nBolt\t4");
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_empty_spreadsheet_is_server_error() {
        let (dir, model, app) = app("unused");
        let workbook = minimal_xlsx(&[("Empty", sheet_xml(&[]))]);
        let body = multipart_body("file", Some("empty.xlsx"), XLSX_MIME_TYPE, &workbook);

        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            "Failed to extract data from the Excel file."
        );
        assert_eq!(model.uploads.load(Ordering::SeqCst), 0);
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_dropped_request_still_cleans_up() {
        let (dir, model, app) = app_with(StubModel::gated("```json\n{}\n```"));
        let body = multipart_body("file", Some("invoice.pdf"), "application/pdf", b"%PDF-1.4");

        let mut request = Box::pin(app.oneshot(upload_request(body)));

        // Drive the request until generation is in flight, then hang up.
        for _ in 0..200 {
            if model.generations.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::select! {
                _ = &mut request => panic!("request finished while generation was blocked"),
                _ = tokio::time::sleep(Duration::from_millis(10)) => {}
            }
        }
        assert_eq!(model.generations.load(Ordering::SeqCst), 1);
        drop(request);

        assert!(!dir_is_empty(&dir));

        model.gate.as_ref().unwrap().notify_one();
        for _ in 0..200 {
            if dir_is_empty(&dir) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (_dir, _model, app) = app("unused");
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/upload")
            .header(header::ORIGIN, "https://invoices.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_health_and_unknown_routes() {
        let (_dir, _model, app) = app("unused");

        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "healthy");

        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
