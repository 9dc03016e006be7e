//! Centralized platform-specific path computation
//!
//! Data, cache, and config locations follow the conventions exposed by the
//! `dirs` crate, each nested under a `commit-rag` folder.

use std::path::PathBuf;

/// Folder name joined under the platform base directories
const APP_FOLDER: &str = "commit-rag";

/// Platform-agnostic path utilities
pub struct PlatformPaths;

impl PlatformPaths {
    /// Application data directory
    ///
    /// Returns: {platform data dir}/commit-rag
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_FOLDER)
    }

    /// Application cache directory
    ///
    /// Returns: {platform cache dir}/commit-rag
    pub fn cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_FOLDER)
    }

    /// Application config directory
    ///
    /// Returns: {platform config dir}/commit-rag
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_FOLDER)
    }

    /// Default LanceDB database path
    ///
    /// Returns: {data_dir}/lancedb
    pub fn default_db_path() -> PathBuf {
        Self::data_dir().join("lancedb")
    }

    /// Default config file path
    ///
    /// Returns: {config_dir}/config.toml
    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Cache directory for downloaded embedding models
    ///
    /// Returns: {cache_dir}/models
    pub fn model_cache_dir() -> PathBuf {
        Self::cache_dir().join("models")
    }
}
