//! Typed application configuration.
//!
//! Loaded once at startup from a YAML file; every field has a default so a
//! missing file is valid. The API credential comes exclusively from the
//! environment and is checked before the server starts.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

pub const CONFIG_PATH_ENV: &str = "STUDYMATE_CONFIG_PATH";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_CONFIG_FILE: &str = "studymate.yml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub openai: OpenAiConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    /// Port 0 binds an ephemeral port.
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8722,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters.
    pub max_chars: usize,
    /// Characters shared between consecutive chunks. Must stay below
    /// `max_chars` or splitting cannot make progress.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Multipart body cap for document uploads.
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 25 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// When set, a daily-rolling log file is written here in addition to
    /// stdout. Unset by default so the server persists nothing.
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    /// Loads the configuration from `STUDYMATE_CONFIG_PATH`, falling back to
    /// `./studymate.yml`, falling back to defaults when neither exists.
    pub fn load() -> Result<Self, ApiError> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Self::from_path(Path::new(&path));
        }

        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_path(&default_path);
        }

        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            ApiError::Configuration(format!("failed to read {}: {}", path.display(), err))
        })?;
        let config: AppConfig = serde_yaml::from_str(&contents).map_err(|err| {
            ApiError::Configuration(format!("invalid config {}: {}", path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.chunking.max_chars == 0 {
            return Err(ApiError::Configuration(
                "chunking.max_chars must be greater than zero".to_string(),
            ));
        }
        if self.chunking.overlap >= self.chunking.max_chars {
            return Err(ApiError::Configuration(
                "chunking.overlap must be smaller than chunking.max_chars".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(ApiError::Configuration(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if self.openai.chat_model.trim().is_empty() {
            return Err(ApiError::Configuration(
                "openai.chat_model must not be empty".to_string(),
            ));
        }
        if self.openai.embedding_model.trim().is_empty() {
            return Err(ApiError::Configuration(
                "openai.embedding_model must not be empty".to_string(),
            ));
        }
        if self.openai.request_timeout_secs == 0 {
            return Err(ApiError::Configuration(
                "openai.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.upload.max_bytes == 0 {
            return Err(ApiError::Configuration(
                "upload.max_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
}

impl Credentials {
    /// Reads the provider credential from the environment. A missing or
    /// blank key refuses startup instead of failing per-call later.
    pub fn from_env() -> Result<Self, ApiError> {
        match env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Self { api_key: key }),
            _ => Err(ApiError::Configuration(format!(
                "{} is not set; refusing to start",
                API_KEY_ENV
            ))),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("api_key", &"****").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.chunking.max_chars, 1000);
        assert_eq!(config.chunking.overlap, 200);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.openai.chat_model, "gpt-4o-mini");
    }

    #[test]
    fn overlap_must_stay_below_max_chars() {
        let mut config = AppConfig::default();
        config.chunking.overlap = config.chunking.max_chars;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn zero_max_chars_is_rejected() {
        let mut config = AppConfig::default();
        config.chunking.max_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studymate.yml");
        fs::write(
            &path,
            "chunking:\n  max_chars: 120\n  overlap: 30\nretrieval:\n  top_k: 2\n",
        )
        .unwrap();

        let config = AppConfig::from_path(&path).unwrap();
        assert_eq!(config.chunking.max_chars, 120);
        assert_eq!(config.chunking.overlap, 30);
        assert_eq!(config.retrieval.top_k, 2);
        assert_eq!(config.server.port, 8722);
        assert_eq!(config.openai.embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn invalid_yaml_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studymate.yml");
        fs::write(&path, "chunking: [not, a, map]\n").unwrap();

        let err = AppConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn missing_credential_refuses_startup() {
        env::remove_var(API_KEY_ENV);
        let err = Credentials::from_env().unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));

        env::set_var(API_KEY_ENV, "sk-test");
        let credentials = Credentials::from_env().unwrap();
        assert_eq!(credentials.api_key, "sk-test");
        env::remove_var(API_KEY_ENV);
    }
}
