use crate::core::dirs::get_config_directory;
use crate::core::error::GitWorkspaceError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_VIRTUAL_NAMESPACE: &str = "notemac-default";
pub const DETACHED_BRANCH: &str = "HEAD";
pub const COMMIT_FETCH_LIMIT: usize = 50;
pub const DEFAULT_AUTHOR_NAME: &str = "Notemac++ User";
pub const DEFAULT_AUTHOR_EMAIL: &str = "user@notemac.app";
pub const DEFAULT_AUTO_FETCH_INTERVAL_MS: u64 = 300_000;
pub const BLAME_MESSAGE_LIMIT: usize = 50;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GitAuthor {
    pub name: String,
    pub email: String,
}

impl Default for GitAuthor {
    fn default() -> Self {
        Self {
            name: DEFAULT_AUTHOR_NAME.to_string(),
            email: DEFAULT_AUTHOR_EMAIL.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GitSettings {
    pub auto_fetch: bool,
    pub auto_fetch_interval_ms: u64,
    pub show_untracked: bool,
    pub show_ignored: bool,
    /// HTTP proxy for remote transport, blank for none
    pub proxy: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            auto_fetch: true,
            auto_fetch_interval_ms: DEFAULT_AUTO_FETCH_INTERVAL_MS,
            show_untracked: true,
            show_ignored: false,
            proxy: String::new(),
        }
    }
}

impl GitSettings {
    pub fn proxy_url(&self) -> Option<&str> {
        let proxy = self.proxy.trim();
        (!proxy.is_empty()).then_some(proxy)
    }
}

/// Persisted git preferences. Credentials are deliberately absent.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GitConfig {
    pub settings: GitSettings,
    pub author: GitAuthor,
}

impl GitConfig {
    pub fn load_or_create() -> Result<Self, GitWorkspaceError> {
        let config_dir = get_config_directory()?;
        Self::load_or_create_in(&config_dir)
    }

    pub fn load_or_create_in(config_dir: &Path) -> Result<Self, GitWorkspaceError> {
        let config_file = config_dir.join("config.json");

        if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_in(config_dir)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<(), GitWorkspaceError> {
        let config_dir = get_config_directory()?;
        self.save_in(&config_dir)
    }

    pub fn save_in(&self, config_dir: &Path) -> Result<(), GitWorkspaceError> {
        std::fs::create_dir_all(config_dir)
            .map_err(|e| GitWorkspaceError::directory_creation_failed(config_dir, e))?;

        let config_file = config_dir.join("config.json");
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_file, content)?;

        Ok(())
    }
}
