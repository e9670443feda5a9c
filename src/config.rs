//! API credential configuration and the fixed on-disk layout.
//!
//! The credential file is written by the separate initializer and read here:
//!
//! ```json
//! { "api_key": "sk-...", "model_type": "deepseek" }
//! ```
//!
//! It lives in a fixed data directory next to a fixed log directory, which
//! in turn holds session logs and the `undo/` subdirectory of ledgers:
//!
//! ```text
//! filefold_data/api.json
//! filefold_log/log_<timestamp>.txt
//! filefold_log/undo/undo_<timestamp>.json
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DATA_DIR: &str = "filefold_data";
const LOG_DIR: &str = "filefold_log";
const API_FILE: &str = "api.json";

/// Directory holding the API credential file.
pub fn data_dir() -> PathBuf {
    PathBuf::from(DATA_DIR)
}

/// Directory holding session logs.
pub fn log_dir() -> PathBuf {
    PathBuf::from(LOG_DIR)
}

/// Directory holding per-run undo ledgers.
pub fn undo_dir() -> PathBuf {
    log_dir().join("undo")
}

/// Default location of the credential file.
pub fn api_config_path() -> PathBuf {
    data_dir().join(API_FILE)
}

/// Which classification model to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Gemini,
    DeepSeek,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::DeepSeek => write!(f, "deepseek"),
        }
    }
}

/// The stored API credential plus model selection.
///
/// Key validation and storage are the initializer's concern; this side only
/// requires the file to exist and both fields to be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub api_key: String,
    pub model_type: ModelKind,
}

impl ApiConfig {
    /// Loads the credential file, from `path` when given, otherwise from the
    /// default location.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_path = api_config_path();
        let path = path.unwrap_or(&default_path);

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let json = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: ApiConfig = serde_json::from_str(&json).map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })?;

        if config.api_key.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "api_key is empty".to_string(),
            });
        }

        Ok(config)
    }
}

/// Errors raised while loading the API configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// No credential file at the expected path.
    NotFound(PathBuf),
    /// The file exists but is not a valid configuration.
    Invalid { reason: String },
    /// IO error while reading the file.
    Io(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(
                    f,
                    "API configuration not found at {}; store an API key there first",
                    path.display()
                )
            }
            ConfigError::Invalid { reason } => {
                write!(f, "Invalid API configuration: {}", reason)
            }
            ConfigError::Io(reason) => {
                write!(f, "Failed to read API configuration: {}", reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
