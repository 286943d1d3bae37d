pub mod file_storage;
pub mod generative_model;
pub mod spreadsheet_converter;

pub use file_storage::FileStorage;
pub use generative_model::{ContentGenerator, FileUploader};
pub use spreadsheet_converter::SpreadsheetConverter;
