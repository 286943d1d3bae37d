use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::domain::entities::ExtractionOutput;

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```json[^\n]*\n([\s\S]*?)```").expect("json fence pattern is valid")
});

#[derive(Debug, Error, PartialEq)]
pub enum ModelResponseError {
    #[error("JSON not found in the AI response.")]
    JsonNotFound,
    #[error("{0}")]
    InvalidJson(String),
    #[error("{0}")]
    SchemaMismatch(String),
}

/// Body of the first ```json fenced block, if any.
pub fn extract_json_block(text: &str) -> Option<&str> {
    JSON_FENCE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|block| block.as_str())
        .filter(|block| !block.trim().is_empty())
}

pub fn parse_model_response(text: &str) -> Result<ExtractionOutput, ModelResponseError> {
    let block = extract_json_block(text).ok_or(ModelResponseError::JsonNotFound)?;

    let value: serde_json::Value = serde_json::from_str(block)
        .map_err(|e| ModelResponseError::InvalidJson(e.to_string()))?;

    ExtractionOutput::from_value(value).map_err(ModelResponseError::SchemaMismatch)
}
