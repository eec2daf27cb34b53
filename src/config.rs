//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the service URL, the step-up policy, and the last used
//! username for pre-filling the login form.
//!
//! Configuration is stored at `~/.config/authkeep/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
const APP_NAME: &str = "authkeep";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the authentication service.
    #[serde(default = "default_service_url")]
    pub service_url: String,
    /// Whether profile saves require step-up verification.
    #[serde(default = "default_require_step_up")]
    pub require_step_up: bool,
    #[serde(default)]
    pub last_username: Option<String>,
}

fn default_service_url() -> String {
    "http://0.0.0.0:8080".to_string()
}

fn default_require_step_up() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            require_step_up: default_require_step_up(),
            last_username: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
