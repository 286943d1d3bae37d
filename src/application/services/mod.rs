pub mod extraction_prompt;
pub mod response_parser;

pub use extraction_prompt::build_request_parts;
pub use response_parser::{ModelResponseError, parse_model_response};
