//! Pre-configured profiles for different deployment scenarios
//!
//! - Development: Verbose logging, small pages
//! - Production: Quiet logging, defaults tuned for interactive agents
//! - LargeVault: Tuned for 5000+ notes
//! - Minimal: Bare essentials only

use crate::config::IndexConfig;
use crate::error::Error;
use std::path::PathBuf;
use std::str::FromStr;

/// Profile selector for pre-configured deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigProfile {
    /// Development: Debug logging, rebuild on change
    Development,
    /// Production: Info logging, conservative batch sizes
    Production,
    /// LargeVault: Bigger files and pages, slower watcher debounce
    LargeVault,
    /// Minimal: No watcher, warnings only
    Minimal,
}

impl ConfigProfile {
    /// Create an IndexConfig for `vault_path` from this profile
    pub fn create_config(self, vault_path: impl Into<PathBuf>) -> IndexConfig {
        let mut config = IndexConfig {
            vault_path: vault_path.into(),
            ..IndexConfig::default()
        };
        config.profile = self.name().to_string();

        match self {
            Self::Development => {
                config.log_level = "debug".to_string();
                config.watch_for_changes = true;
                config.watch_debounce_ms = 100;
                config.default_page_limit = 20;
            }
            Self::Production => {
                config.log_level = "info".to_string();
                config.watch_for_changes = true;
                config.max_batch_size = 25;
            }
            Self::LargeVault => {
                config.log_level = "info".to_string();
                config.max_file_size = 50 * 1024 * 1024; // 50MB
                config.default_page_limit = 100;
                config.watch_debounce_ms = 1000;
            }
            Self::Minimal => {
                config.log_level = "warn".to_string();
                config.watch_for_changes = false;
            }
        }

        config
    }

    /// Profile name as accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::LargeVault => "large-vault",
            Self::Minimal => "minimal",
        }
    }
}

impl FromStr for ConfigProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "large-vault" | "large" => Ok(Self::LargeVault),
            "minimal" => Ok(Self::Minimal),
            other => Err(Error::config_error(format!("Unknown profile: {}", other))),
        }
    }
}
