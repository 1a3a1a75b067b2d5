//! Configuration file handling
//!
//! Named SO3 environments live in `~/.config/so3-cli/config.toml`.
//! Passwords are never stored; they come from `SO3_PASSWORD` or an
//! interactive prompt.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::import::IdentificationStrategy;

/// One SO3 server an operator works against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    /// Base URL of the SO3 Web API, e.g. `https://so3.example.com`
    pub url: String,
    pub username: String,
    /// Locale used for descriptions and placement queries
    #[serde(default = "default_data_language")]
    pub data_language: String,
    /// How macro-cluster identifications are picked during import
    #[serde(default)]
    pub identification_strategy: IdentificationStrategy,
}

fn default_data_language() -> String {
    "en-US".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Name of the environment used when `--env` is not given
    pub current_environment: Option<String>,
    #[serde(default)]
    pub environments: BTreeMap<String, Environment>,
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine the config directory")?;
        Ok(base.join("so3-cli").join("config.toml"))
    }

    /// Load the config file; a missing file is an empty config
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Resolve an environment by name, falling back to the selected one
    pub fn environment(&self, name: Option<&str>) -> Result<(&str, &Environment)> {
        let name = match name.or(self.current_environment.as_deref()) {
            Some(name) => name,
            None => bail!(
                "No environment selected. Use 'so3-cli auth select' to choose one or pass --env."
            ),
        };

        match self.environments.get_key_value(name) {
            Some((name, environment)) => Ok((name.as_str(), environment)),
            None => bail!("Unknown environment '{}'. Use 'so3-cli auth add' to create it.", name),
        }
    }
}
