//! Configuration management for ConfigCore.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Directory name of the local package store under the home directory.
pub const DEFAULT_STORE_DIR_NAME: &str = ".config_editor_packages";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Remote package repository settings
    pub remote: RemoteConfig,

    /// Plugin discovery settings
    pub plugins: PluginsConfig,

    /// Terminal UI settings
    pub ui: UiConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Config file to edit (a leading `~` is expanded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<PathBuf>,

    /// Whether to write a timestamped backup before saving
    pub backup_on_save: bool,
}

/// Remote package repository settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Branch to install from
    pub branch: String,

    /// Contents API root (without the `/repos/...` suffix)
    pub api_root: String,

    /// Host serving branch snapshot archives, optionally with a scheme
    pub archive_host: String,

    /// Optional access token (raises rate limits, grants private repo access)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Timeout for listing and manifest requests
    pub list_timeout_secs: u64,

    /// Timeout for snapshot archive downloads
    pub download_timeout_secs: u64,
}

/// Plugin discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Local package store (defaults to `~/.config_editor_packages`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,

    /// Name of the development plugins directory in the working directory
    pub local_dir: String,

    /// File name suffix of single-file plugin modules in the working directory
    pub single_file_suffix: String,
}

/// Terminal UI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Built-in theme name
    pub theme: String,

    /// Optional accent color override (`#rrggbb`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.configcore.toml` in current directory
    /// 2. `~/.config/configcore/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let local_config = PathBuf::from(".configcore.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = Self::config_dir() {
            let global_config = config_dir.join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(config_path)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("configcore"))
    }

    /// Resolved local package store root.
    pub fn store_dir(&self) -> PathBuf {
        match self.plugins.store_dir {
            Some(ref dir) => expand_path(dir),
            None => dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(DEFAULT_STORE_DIR_NAME),
        }
    }

    /// Configured document path, tilde-expanded.
    pub fn document_path(&self) -> Option<PathBuf> {
        self.general.document.as_deref().map(expand_path)
    }
}

impl RemoteConfig {
    /// Contents API URL of the repository root.
    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents",
            self.api_root.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// Snapshot archive URL for a branch.
    ///
    /// `archive_host` may carry its own scheme (`http://127.0.0.1:8080`);
    /// a bare host name gets `https://`.
    pub fn archive_url(&self, branch: &str) -> String {
        let host = self.archive_host.trim_end_matches('/');
        let base =
            if host.contains("://") { host.to_string() } else { format!("https://{host}") };
        format!(
            "{}/{}/{}/archive/refs/heads/{}.zip",
            base,
            self.owner,
            self.repo,
            urlencoding::encode(branch)
        )
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { document: None, backup_on_save: true }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            owner: "haxpenguin2".to_string(),
            repo: "ConfigCoreModules".to_string(),
            branch: "main".to_string(),
            api_root: "https://api.github.com".to_string(),
            archive_host: "github.com".to_string(),
            token: None,
            list_timeout_secs: 15,
            download_timeout_secs: 30,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { theme: "default".to_string(), accent: None }
    }
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            local_dir: "plugins".to_string(),
            single_file_suffix: "_plugin.json".to_string(),
        }
    }
}
