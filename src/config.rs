//! Configuration system for commit-rag
//!
//! Values are resolved with the priority:
//! Environment variables > Config file > Defaults

use crate::error::{ConfigError, RagError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Vector store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Embedding model configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Indexing configuration
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Generative backend configuration
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// LanceDB data directory path
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Collection (table) name for commit documents
    #[serde(default = "default_collection")]
    pub collection: String,
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name (e.g. "all-MiniLM-L6-v2")
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Directory for downloaded model files
    #[serde(default = "default_model_cache_dir")]
    pub cache_dir: PathBuf,
}

/// Indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Documents written to the store per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of documents retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Generative backend configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the chat-completions API
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model identifier sent with each request
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_db_path() -> PathBuf {
    crate::paths::PlatformPaths::default_db_path()
}

fn default_collection() -> String {
    "git_commits".to_string()
}

fn default_model_name() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_model_cache_dir() -> PathBuf {
    crate::paths::PlatformPaths::model_cache_dir()
}

fn default_batch_size() -> usize {
    100
}

fn default_top_k() -> usize {
    5
}

fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_generation_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_generation_timeout() -> u64 {
    120
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            collection: default_collection(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            cache_dir: default_model_cache_dir(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, RagError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location, or fall back to defaults
    pub fn load_or_default() -> Result<Self, RagError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), RagError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), RagError> {
        if self.store.collection.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "store.collection".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.embedding.model_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "embedding.model_name".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.indexing.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "indexing.batch_size".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "retrieval.top_k".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.generation.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "generation.base_url".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.generation.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "generation.model".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "generation.timeout_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("COMMIT_RAG_DB_PATH") {
            self.store.db_path = PathBuf::from(path);
        }

        if let Ok(name) = std::env::var("COMMIT_RAG_COLLECTION") {
            self.store.collection = name;
        }

        if let Ok(model) = std::env::var("COMMIT_RAG_EMBEDDING_MODEL") {
            self.embedding.model_name = model;
        }

        if let Ok(batch_size) = std::env::var("COMMIT_RAG_BATCH_SIZE")
            && let Ok(size) = batch_size.parse()
        {
            self.indexing.batch_size = size;
        }

        if let Ok(top_k) = std::env::var("COMMIT_RAG_TOP_K")
            && let Ok(k) = top_k.parse()
        {
            self.retrieval.top_k = k;
        }

        if let Ok(url) = std::env::var("COMMIT_RAG_GENERATION_URL") {
            self.generation.base_url = url;
        }

        if let Ok(model) = std::env::var("COMMIT_RAG_GENERATION_MODEL") {
            self.generation.model = model;
        }
    }

    /// Create a Config from the default file location plus environment overrides
    pub fn new() -> Result<Self, RagError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.store.collection, "git_commits");
        assert_eq!(config.embedding.model_name, "all-MiniLM-L6-v2");
        assert_eq!(config.indexing.batch_size, 100);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.generation.model, "gemini-2.5-flash");
        assert_eq!(config.generation.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = Config::default();
        config.indexing.batch_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("indexing.batch_size"));
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let mut config = Config::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = Config::default();
        config.embedding.model_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[indexing]\nbatch_size = 25\n").unwrap();
        assert_eq!(config.indexing.batch_size, 25);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.store.collection, "git_commits");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.store.collection = "history_test".to_string();
        config.retrieval.top_k = 7;
        config.save(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.store.collection, "history_test");
        assert_eq!(reloaded.retrieval.top_k, 7);
    }

    #[test]
    fn test_from_file_missing_path() {
        let dir = TempDir::new().unwrap();
        let result = Config::from_file(&dir.path().join("nope.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_env_overrides() {
        let original = std::env::var("COMMIT_RAG_TOP_K").ok();
        unsafe {
            std::env::set_var("COMMIT_RAG_TOP_K", "9");
        }

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.retrieval.top_k, 9);

        unsafe {
            match original {
                Some(val) => std::env::set_var("COMMIT_RAG_TOP_K", val),
                None => std::env::remove_var("COMMIT_RAG_TOP_K"),
            }
        }
    }
}
