//! Application configuration.
//!
//! Stored as JSON at `<config dir>/gitcms/config.json` and created with
//! defaults on first use.

use crate::core::dirs::{get_cache_directory, get_config_directory};
use crate::core::error::Result;
use crate::core::remote::DEFAULT_CONFIG_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CACHE_DIR_ENV: &str = "GITCMS_CACHE_DIR";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Repository-relative path of the configuration document
    pub config_path: String,
    pub log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_author: Option<CommitAuthor>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            log_level: "info".to_string(),
            cache_dir: None,
            commit_author: None,
        }
    }
}

impl AppConfig {
    pub fn load_or_create() -> Result<Self> {
        let config_dir = get_config_directory()?;
        Self::load_or_create_in(&config_dir)
    }

    pub fn load_or_create_in(config_dir: &Path) -> Result<Self> {
        let config_file = config_dir.join(CONFIG_FILE_NAME);

        if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)?;
            log::debug!("Loaded app config from {}", config_file.display());
            Ok(serde_json::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_in(config_dir)?;
            Ok(config)
        }
    }

    pub fn save_in(&self, config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir)?;

        let config_file = config_dir.join(CONFIG_FILE_NAME);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_file, content)?;

        Ok(())
    }

    /// `GITCMS_CACHE_DIR`, then the configured override, then the platform cache dir
    pub fn resolve_cache_dir(&self) -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => get_cache_directory(),
        }
    }
}
