//! Configuration management for registrar
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Qdrant connection URL
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    /// Environment variable name for Qdrant API key
    #[serde(default = "default_qdrant_api_key_env")]
    pub qdrant_api_key_env: String,

    /// Qdrant collection name
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Query configuration
    #[serde(default)]
    pub query: QueryConfig,

    /// Profile store configuration
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Inference endpoint URL for the embedding model
    #[serde(default = "default_embedding_api_url")]
    pub api_url: String,

    /// Environment variable name for the embedding API key
    #[serde(default = "default_embedding_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Embedding dimension (must match model)
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Input character budget before word-boundary truncation
    #[serde(default = "default_embedding_max_chars")]
    pub max_chars: usize,
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Default number of results
    #[serde(default = "default_query_limit")]
    pub default_limit: usize,

    /// Minimum similarity score (0.0 - 1.0)
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Result window for eligibility queries
    #[serde(default = "default_eligibility_limit")]
    pub eligibility_limit: usize,
}

/// Profile store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Profile data file name, relative to the base directory
    #[serde(default = "default_profile_data_file")]
    pub data_file: String,

    /// Lock acquisition timeout in seconds
    #[serde(default = "default_profile_lock_timeout")]
    pub lock_timeout_secs: u64,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for registrar data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to the profile data file
    pub profile_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
            qdrant_api_key_env: default_qdrant_api_key_env(),
            collection_name: default_collection_name(),
            embedding: EmbeddingConfig::default(),
            query: QueryConfig::default(),
            profile: ProfileConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: default_embedding_api_url(),
            api_key_env: default_embedding_api_key_env(),
            timeout_secs: default_embedding_timeout(),
            dimension: default_embedding_dimension(),
            max_chars: default_embedding_max_chars(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_query_limit(),
            score_threshold: default_score_threshold(),
            eligibility_limit: default_eligibility_limit(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            data_file: default_profile_data_file(),
            lock_timeout_secs: default_profile_lock_timeout(),
        }
    }
}

impl Config {
    /// Get the default base directory for registrar (~/.registrar)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".registrar")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    fn init_paths(&mut self, base: PathBuf) {
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            profile_file: base.join(&self.profile.data_file),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        // Set up paths based on config file location
        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            profile_file: base.join(&config.profile.data_file),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_config_path())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Build a default config rooted at the given base directory
    pub fn with_base_dir(base: Option<PathBuf>) -> Self {
        let mut config = Config::default();
        config.init_paths(base.unwrap_or_else(Self::default_base_dir));
        config
    }

    /// Get the Qdrant API key from environment
    pub fn qdrant_api_key(&self) -> Option<String> {
        std::env::var(&self.qdrant_api_key_env).ok()
    }

    /// Get the embedding API key from environment
    pub fn embedding_api_key(&self) -> Option<String> {
        std::env::var(&self.embedding.api_key_env).ok()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.query.score_threshold < 0.0 || self.query.score_threshold > 1.0 {
            return Err(Error::Config(
                "query.score_threshold must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.embedding.dimension == 0 {
            return Err(Error::Config(
                "embedding.dimension must be positive".to_string(),
            ));
        }

        if self.embedding.max_chars == 0 {
            return Err(Error::Config(
                "embedding.max_chars must be positive".to_string(),
            ));
        }

        if self.query.default_limit == 0 || self.query.eligibility_limit == 0 {
            return Err(Error::Config(
                "query limits must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.embedding.dimension, 1024);
        assert_eq!(config.query.default_limit, 5);
        assert_eq!(config.query.eligibility_limit, 7);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            collection_name = "custom"

            [query]
            score_threshold = 0.75
            "#,
        )
        .unwrap();

        assert_eq!(config.collection_name, "custom");
        assert_eq!(config.query.score_threshold, 0.75);
        assert_eq!(config.query.default_limit, 5);
        assert_eq!(config.embedding.max_chars, 2000);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = Config::default();
        config.query.score_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_base_dir(Some(dir.path().to_path_buf()));
        config.collection_name = "roundtrip".to_string();
        config.save().unwrap();

        let loaded = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(loaded.collection_name, "roundtrip");
        assert_eq!(loaded.paths.base_dir, dir.path());
    }
}
