use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError, Response};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::application::ports::generative_model::{
    ContentGenerator, ContentPart, FileUploadRequest, FileUploader, GenerativeServiceError,
    RemoteFile,
};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Clone)]
pub struct GeminiClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

// Hand-written so the key never ends up in a log line.
impl std::fmt::Debug for GeminiClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Serialize)]
struct FileMetadataEnvelope<'a> {
    file: FileMetadata<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata<'a> {
    name: String,
    display_name: &'a str,
    mime_type: &'a str,
}

#[derive(Deserialize)]
struct UploadFileResponse {
    file: Option<FileResource>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: Option<String>,
    uri: Option<String>,
    mime_type: Option<String>,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

impl From<ContentPart> for RequestPart {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => RequestPart {
                text: Some(text),
                file_data: None,
            },
            ContentPart::FileData {
                mime_type,
                file_uri,
            } => RequestPart {
                text: None,
                file_data: Some(FileData {
                    mime_type,
                    file_uri,
                }),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GenerateResponse {
    /// Text of the first candidate, all parts concatenated.
    fn text(self) -> Result<String, GenerativeServiceError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            GenerativeServiceError::InvalidResponse(match block_reason {
                Some(reason) => format!("Prompt was blocked: {}", reason),
                None => "No candidates in response".to_string(),
            })
        })?;

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            return Err(GenerativeServiceError::InvalidResponse(format!(
                "Candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

/// REST client for the Gemini File API and `generateContent`.
///
/// Stateless between calls; one instance is shared by every request.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiClientConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder().build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/upload/v1beta/files",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn check_status(response: Response) -> Result<Response, GenerativeServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|parsed| parsed.error.message)
            .unwrap_or(body);

        Err(GenerativeServiceError::ApiError {
            status: status.as_u16(),
            message,
        })
    }
}

/// The File API wants resource names of the form `files/<id>`.
pub fn resource_name(name: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("files/{}", name)
    }
}

/// `multipart/related` body: JSON metadata part, then the media part.
pub fn build_multipart_related(
    boundary: &str,
    metadata_json: &str,
    mime_type: &str,
    data: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + metadata_json.len() + 256);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=utf-8\r\n\r\n{metadata_json}\r\n--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[async_trait]
impl FileUploader for GeminiClient {
    async fn upload_file(
        &self,
        local_path: &Path,
        request: FileUploadRequest,
    ) -> Result<RemoteFile, GenerativeServiceError> {
        let data = tokio::fs::read(local_path)
            .await
            .map_err(|e| GenerativeServiceError::IoError(e.to_string()))?;

        let metadata = serde_json::to_string(&FileMetadataEnvelope {
            file: FileMetadata {
                name: resource_name(&request.name),
                display_name: &request.display_name,
                mime_type: &request.mime_type,
            },
        })
        .map_err(|e| GenerativeServiceError::InvalidResponse(e.to_string()))?;

        let boundary = Uuid::new_v4().simple().to_string();
        let body = build_multipart_related(&boundary, &metadata, &request.mime_type, &data);

        tracing::debug!(
            "Uploading {} bytes as {} ({})",
            data.len(),
            request.display_name,
            request.mime_type
        );

        let response = self
            .client
            .post(self.upload_url())
            .header("x-goog-api-key", &self.config.api_key)
            .header("X-Goog-Upload-Protocol", "multipart")
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| GenerativeServiceError::NetworkError(e.without_url().to_string()))?;

        let response = Self::check_status(response).await?;

        let parsed = response
            .json::<UploadFileResponse>()
            .await
            .map_err(|e| GenerativeServiceError::InvalidResponse(e.without_url().to_string()))?;

        Ok(parsed
            .file
            .map(|file| RemoteFile {
                name: file.name,
                uri: file.uri,
                mime_type: file.mime_type,
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_content(
        &self,
        parts: Vec<ContentPart>,
    ) -> Result<String, GenerativeServiceError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: parts.into_iter().map(RequestPart::from).collect(),
            }],
        };

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerativeServiceError::NetworkError(e.without_url().to_string()))?;

        let response = Self::check_status(response).await?;

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| GenerativeServiceError::InvalidResponse(e.without_url().to_string()))?
            .text()
    }
}
