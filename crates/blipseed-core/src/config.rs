use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::DEFAULT_BOT_RATE;
use crate::error::ErrorCode;
use crate::request::GraphSeedRequest;
use crate::stats::DEFAULT_TOP_HUBS;

/// Contents of `config.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Request values used when the command line leaves them out.
    #[serde(default)]
    pub defaults: GraphSeedRequest,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub store: StoreConfig,
    /// Preferred output mode (`pretty`, `text`, `json`).
    #[serde(default)]
    pub output: Option<String>,
}

/// Knobs that are not part of the request contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_bot_rate")]
    pub bot_rate: f64,
    #[serde(default = "default_top_hubs")]
    pub top_hubs: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            bot_rate: default_bot_rate(),
            top_hubs: default_top_hubs(),
        }
    }
}

/// SQLite store location and the charge it reports per row written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_account_charge")]
    pub account_charge: f64,
    #[serde(default = "default_person_charge")]
    pub person_charge: f64,
    #[serde(default = "default_follow_charge")]
    pub follow_charge: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            account_charge: default_account_charge(),
            person_charge: default_person_charge(),
            follow_charge: default_follow_charge(),
        }
    }
}

/// Read a config file.
///
/// # Errors
///
/// Returns an error tagged with [`ErrorCode::ConfigParseError`] if the file
/// cannot be read or is not valid TOML.
pub fn load_config_file(path: &Path) -> Result<SeedConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .context(ErrorCode::ConfigParseError)?;

    toml::from_str::<SeedConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
        .context(ErrorCode::ConfigParseError)
}

/// Default config location: `<config_dir>/blipseed/config.toml`.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("blipseed/config.toml"))
}

/// Load `explicit` if given, else the user config if it exists, else
/// defaults.
///
/// # Errors
///
/// Returns an error if the chosen file exists but cannot be read or parsed.
/// An explicit path that does not exist is an error too.
pub fn load_config(explicit: Option<&Path>) -> Result<SeedConfig> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    match user_config_path() {
        Some(path) if path.exists() => load_config_file(&path),
        _ => Ok(SeedConfig::default()),
    }
}

const fn default_bot_rate() -> f64 {
    DEFAULT_BOT_RATE
}

const fn default_top_hubs() -> usize {
    DEFAULT_TOP_HUBS
}

const fn default_account_charge() -> f64 {
    1.0
}

const fn default_person_charge() -> f64 {
    5.0
}

const fn default_follow_charge() -> f64 {
    5.0
}
