// Application settings
// Loaded from ~/.config/castgrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Environment variable overriding `api.baseUrl`.
pub const API_URL_ENV: &str = "CASTGRID_API_URL";

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Backend
    #[serde(rename = "api.baseUrl")]
    pub api_base_url: String,

    // Table view
    #[serde(rename = "table.pageSize")]
    pub page_size: u64,

    // Raw preview
    #[serde(rename = "preview.rows")]
    pub preview_rows: usize,

    // Logging (tracing filter directive)
    #[serde(rename = "log.level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            page_size: 100,
            preview_rows: 5,
            log_level: "warn".to_string(),
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Backend ingestion service
    // CASTGRID_API_URL and --api-url override this
    "api.baseUrl": "http://localhost:8000",

    // Rows per page in `castgrid view`
    "table.pageSize": 100,

    // Data rows shown by `castgrid preview` (minimum 5)
    "preview.rows": 5,

    // Log filter, e.g. "warn", "debug", "castgrid_core=trace"
    // CASTGRID_LOG overrides this
    "log.level": "warn"
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("castgrid");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings, falling back to defaults.
    ///
    /// A missing file is created with commented defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            Self::create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(serde_json::from_str(&cleaned)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!("Error creating config directory: {}", e);
                return;
            }
        }
        if let Err(e) = fs::write(path, DEFAULT_FILE) {
            tracing::warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Effective backend base URL: `flag`, then `$CASTGRID_API_URL`, then
    /// the file.
    pub fn api_base(&self, flag: Option<&str>) -> Result<String, ConfigError> {
        let env = std::env::var(API_URL_ENV).ok();
        self.api_base_with(flag, env.as_deref())
    }

    pub fn api_base_with(&self, flag: Option<&str>, env: Option<&str>) -> Result<String, ConfigError> {
        let raw = flag
            .or(env.filter(|v| !v.is_empty()))
            .unwrap_or(&self.api_base_url);
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::MissingApiUrl(raw.to_string()));
        }
        Ok(trimmed.to_string())
    }
}
