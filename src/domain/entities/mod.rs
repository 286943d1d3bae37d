pub mod extraction_result;
pub mod uploaded_file;

pub use extraction_result::ExtractionOutput;
pub use uploaded_file::UploadedFile;
