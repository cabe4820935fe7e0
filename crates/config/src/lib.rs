// Configuration loading

pub mod settings;

use thiserror::Error;

pub use settings::{Settings, API_URL_ENV, DEFAULT_API_BASE};

#[derive(Debug, Error)]
pub enum ConfigError {
    /// No usable backend base URL after applying overrides
    #[error("backend API URL is not set (got {0:?})")]
    MissingApiUrl(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}
