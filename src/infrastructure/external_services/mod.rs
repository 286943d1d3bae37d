pub mod gemini_client;

pub use gemini_client::{GeminiClient, GeminiClientConfig};
