use std::path::{Path, PathBuf};

use crate::domain::value_objects::document_kind::PLAIN_TEXT_MIME_TYPE;

/// The file actually sent to the generative service, after any conversion.
///
/// `mime_type` always describes the bytes at `source_path`: a converted
/// spreadsheet is plain text, never the original spreadsheet type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPayload {
    mime_type: String,
    source_path: PathBuf,
    converted: bool,
}

impl NormalizedPayload {
    pub fn pass_through(mime_type: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            mime_type: mime_type.into(),
            source_path: source_path.into(),
            converted: false,
        }
    }

    pub fn converted_text(source_path: impl Into<PathBuf>) -> Self {
        Self {
            mime_type: PLAIN_TEXT_MIME_TYPE.to_string(),
            source_path: source_path.into(),
            converted: true,
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Whether `source_path` is a temporary file produced by conversion.
    pub fn is_converted(&self) -> bool {
        self.converted
    }
}
