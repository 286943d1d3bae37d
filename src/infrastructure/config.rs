use std::path::PathBuf;
use thiserror::Error;

use crate::infrastructure::external_services::GeminiClientConfig;
use crate::infrastructure::external_services::gemini_client::{DEFAULT_API_BASE, DEFAULT_MODEL};

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("port", &self.port)
            .field("upload_dir", &self.upload_dir)
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_base", &self.gemini_api_base)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl AppConfig {
    /// Reads the process environment. Call `dotenv` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = non_empty("API_KEY").ok_or(ConfigError::Missing("API_KEY"))?;

        let port = match non_empty("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match non_empty("MAX_UPLOAD_BYTES") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid {
                    name: "MAX_UPLOAD_BYTES",
                    value,
                })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            api_key,
            port,
            upload_dir: PathBuf::from(
                non_empty("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            ),
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_base: non_empty("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            max_upload_bytes,
        })
    }

    pub fn gemini_client_config(&self) -> GeminiClientConfig {
        GeminiClientConfig {
            api_key: self.api_key.clone(),
            base_url: self.gemini_api_base.clone(),
            model: self.gemini_model.clone(),
        }
    }
}
