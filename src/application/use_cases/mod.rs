pub mod ingest_document;

pub use ingest_document::{IngestDocumentUseCase, IngestError};
