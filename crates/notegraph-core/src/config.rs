//! Configuration types for NoteGraph.
//!
//! Follows a builder pattern for complex configuration with validation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Default page size for list operations
pub const DEFAULT_PAGE_LIMIT: usize = 50;
/// Default cap on names accepted by batch operations
pub const DEFAULT_MAX_BATCH_SIZE: usize = 50;
/// Default edit distance for similar-name lookups
pub const DEFAULT_SIMILARITY_THRESHOLD: usize = 3;

/// Index and query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Root directory of the note collection
    pub vault_path: PathBuf,
    /// Configuration profile name
    pub profile: String,

    // Document store
    pub max_file_size: u64,
    pub allowed_extensions: HashSet<String>,
    pub excluded_paths: HashSet<String>,

    // Query layer
    pub default_page_limit: usize,
    pub max_batch_size: usize,
    pub similarity_threshold: usize,

    // Rebuild on change
    pub watch_for_changes: bool,
    pub watch_debounce_ms: u64,

    pub log_level: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            vault_path: PathBuf::from("."),
            profile: "default".to_string(),
            max_file_size: 10 * 1024 * 1024, // 10MB
            allowed_extensions: [".md"].iter().map(|s| s.to_string()).collect(),
            excluded_paths: [".obsidian", ".git", ".trash", ".DS_Store", "node_modules"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_page_limit: DEFAULT_PAGE_LIMIT,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            watch_for_changes: false,
            watch_debounce_ms: 250,
            log_level: "info".to_string(),
        }
    }
}

impl IndexConfig {
    /// Create a new config with builder
    pub fn builder(vault_path: impl Into<PathBuf>) -> IndexConfigBuilder {
        IndexConfigBuilder::new(vault_path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.vault_path.exists() {
            return Err(Error::config_error(format!(
                "Vault path does not exist: {}",
                self.vault_path.display()
            )));
        }

        if !self.vault_path.is_dir() {
            return Err(Error::config_error(format!(
                "Vault path is not a directory: {}",
                self.vault_path.display()
            )));
        }

        if self.allowed_extensions.is_empty() {
            return Err(Error::config_error("At least one file extension is required"));
        }

        if self.default_page_limit == 0 {
            return Err(Error::config_error("default_page_limit must be positive"));
        }

        if self.max_batch_size == 0 {
            return Err(Error::config_error("max_batch_size must be positive"));
        }

        Ok(())
    }

    /// Check whether a file name has an indexed extension
    pub fn is_allowed_extension(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.allowed_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }
}

/// Builder for IndexConfig
pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl IndexConfigBuilder {
    /// Create a new builder
    pub fn new(vault_path: impl Into<PathBuf>) -> Self {
        Self {
            config: IndexConfig {
                vault_path: vault_path.into(),
                ..IndexConfig::default()
            },
        }
    }

    /// Exclude an additional directory name
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.config.excluded_paths.insert(name.into());
        self
    }

    /// Set maximum indexed file size in bytes
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// Set the batch cap
    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.config.max_batch_size = size;
        self
    }

    /// Set the default page size
    pub fn default_page_limit(mut self, limit: usize) -> Self {
        self.config.default_page_limit = limit;
        self
    }

    /// Enable rebuild-on-change
    pub fn watch_for_changes(mut self, watch: bool) -> Self {
        self.config.watch_for_changes = watch;
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<IndexConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_builder() {
        let temp = TempDir::new().unwrap();
        let config = IndexConfig::builder(temp.path())
            .exclude("Templates")
            .max_batch_size(10)
            .build()
            .unwrap();

        assert_eq!(config.vault_path, temp.path());
        assert!(config.excluded_paths.contains("Templates"));
        assert!(config.excluded_paths.contains(".git"));
        assert_eq!(config.max_batch_size, 10);
    }

    #[test]
    fn test_missing_vault_rejected() {
        let result = IndexConfig::builder("/definitely/not/a/real/vault").build();
        assert!(matches!(result, Err(Error::ConfigError { .. })));
    }

    #[test]
    fn test_zero_batch_rejected() {
        let temp = TempDir::new().unwrap();
        let result = IndexConfig::builder(temp.path()).max_batch_size(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_allowed_extension() {
        let config = IndexConfig::default();
        assert!(config.is_allowed_extension("Note.md"));
        assert!(config.is_allowed_extension("NOTE.MD"));
        assert!(!config.is_allowed_extension("image.png"));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: IndexConfig =
            serde_json::from_str(r#"{"vault_path": "/tmp", "max_batch_size": 5}"#).unwrap();
        assert_eq!(config.max_batch_size, 5);
        assert_eq!(config.default_page_limit, DEFAULT_PAGE_LIMIT);
    }
}
