pub mod document_kind;
pub mod normalized_payload;

pub use document_kind::DocumentKind;
pub use normalized_payload::NormalizedPayload;
