//! Layered configuration: profile defaults, then a config file, then
//! `NOTEGRAPH_*` environment variables, then the command line.

use config::{Config, Environment, File};
use notegraph_core::prelude::*;
use std::path::{Path, PathBuf};

/// Prefix of environment overrides, e.g. `NOTEGRAPH_MAX_BATCH_SIZE=20`
pub const ENV_PREFIX: &str = "NOTEGRAPH";

/// Where configuration comes from
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Vault path given on the command line; wins over every other layer
    pub vault: Option<String>,
    /// Config file (format picked from its extension)
    pub file: Option<PathBuf>,
    /// Profile whose presets form the base layer
    pub profile: Option<String>,
    /// Read `NOTEGRAPH_*` variables
    pub use_env: bool,
}

impl ConfigSources {
    pub fn new() -> Self {
        Self {
            use_env: true,
            ..Self::default()
        }
    }

    pub fn vault(mut self, vault: impl Into<String>) -> Self {
        self.vault = Some(vault.into());
        self
    }

    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Merge every layer into an [`IndexConfig`]. The result is not validated.
    pub fn load(&self) -> Result<IndexConfig> {
        let base = match &self.profile {
            Some(name) => name.parse::<ConfigProfile>()?.create_config("."),
            None => IndexConfig::default(),
        };

        let mut builder = Config::builder().add_source(
            Config::try_from(&base)
                .map_err(|e| Error::config_error(format!("Invalid base config: {}", e)))?,
        );

        if let Some(file) = &self.file {
            if !file.exists() {
                return Err(Error::config_error(format!(
                    "Config file not found: {}",
                    file.display()
                )));
            }
            builder = builder.add_source(File::from(file.as_path()).required(true));
        }

        if self.use_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_extensions")
                    .with_list_parse_key("excluded_paths"),
            );
        }

        let mut config: IndexConfig = builder
            .build()
            .and_then(Config::try_deserialize::<IndexConfig>)
            .map_err(|e| Error::config_error(e.to_string()))?;

        if let Some(vault) = &self.vault {
            config.vault_path = expand_path(vault)?;
        }
        if let Some(profile) = &self.profile {
            config.profile = profile.clone();
        }

        log::debug!("Loaded config for {}", config.vault_path.display());
        Ok(config)
    }
}

/// Expand `~` and environment variables in a user-supplied path
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| Error::invalid_path(format!("Failed to expand path: {}", e)))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Load with the default layering and an optional vault override
pub fn load_config(
    vault: Option<&str>,
    file: Option<&Path>,
    profile: Option<&str>,
) -> Result<IndexConfig> {
    let mut sources = ConfigSources::new();
    sources.vault = vault.map(str::to_string);
    sources.file = file.map(Path::to_path_buf);
    sources.profile = profile.map(str::to_string);
    sources.load()
}
