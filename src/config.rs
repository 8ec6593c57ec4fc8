//! Application configuration: a small JSON document under the platform config
//! directory. Every field has a default so a missing or partial file is fine.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

const CONFIG_DIR: &str = "wealth_core";
const CONFIG_FILE: &str = "config.json";

fn default_retention() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Overrides the platform data directory for the JSON storage root.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// How many timestamped book backups to keep.
    #[serde(default = "default_retention")]
    pub backup_retention: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            backup_retention: default_retention(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| CoreError::Persistence("no platform config directory available".into()))?;
        Ok(base.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads the config file, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
