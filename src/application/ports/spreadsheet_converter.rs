use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpreadsheetConversionError {
    #[error("Error extracting text from Excel: No sheets found in the Excel file.")]
    NoSheetsFound,
    #[error("Error extracting text from Excel: {0}")]
    ConversionFailure(String),
}

/// Turns the first sheet of a workbook into tab/newline separated text.
///
/// An empty sheet yields an empty string, not an error.
pub trait SpreadsheetConverter: Send + Sync {
    fn convert_to_text(&self, path: &Path) -> Result<String, SpreadsheetConversionError>;
}
