//! Configuration file support
//!
//! Settings live in a TOML file. Lookup order: an explicit path (the
//! `--config` flag), then `$ETHBASIS_CONFIG`, then
//! `<config home>/ethbasis/config.toml`. A missing file means defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "ETHBASIS_CONFIG";

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Acquisition source: reward cache (.json) or lots file (.csv)
    pub lots: PathBuf,
    /// Disposal source (.csv)
    pub sells: PathBuf,
    /// Reward cache used by the income summary
    pub reward_cache: PathBuf,
    /// Fiat rounding for table output only
    pub decimal_places: u32,
    /// Label for the fiat currency in table headers
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lots: PathBuf::from(".transactionCache.json"),
            sells: PathBuf::from("sells.csv"),
            reward_cache: PathBuf::from(".transactionCache.json"),
            decimal_places: 2,
            currency: "USD".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when no file exists
    ///
    /// An explicitly requested file that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(p) => (Some(p.to_path_buf()), true),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(p) => (Some(PathBuf::from(p)), true),
                None => (default_config_path(), false),
            },
        };

        let Some(path) = path else {
            debug!("No config directory available, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            if required {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        info!("Loading config from {:?}", path);
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Default config location under the platform config directory
pub fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join("ethbasis").join("config.toml"))
}
