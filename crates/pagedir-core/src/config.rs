use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Env var that overrides the configured owner
pub const OWNER_ENV: &str = "PAGEDIR_OWNER";

/// Main configuration structure
///
/// This gets loaded from config file, env vars, and CLI args.
/// Priority: CLI > Env > File > Defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load config from default location, or defaults if there is none
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&contents)?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later, mid-render
    pub fn validate(&self) -> crate::Result<()> {
        let pattern = &self.ui.date_format;
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(crate::Error::ConfigError(format!(
                "Invalid ui.date_format {:?}",
                pattern
            )));
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(owner) = std::env::var(OWNER_ENV) {
            if !owner.trim().is_empty() {
                self.github.owner = owner.trim().to_string();
            }
        }
    }

    /// Uses XDG on Linux, the platform equivalents elsewhere
    pub fn config_path() -> crate::Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("pagedir")
            .join("config.toml"))
    }

    /// Configured preference database, or one in the data directory
    pub fn preferences_path(&self) -> Option<PathBuf> {
        self.preferences
            .db_path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("pagedir").join("preferences.db")))
    }

    /// Where the TUI writes its log
    pub fn log_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join("pagedir").join("pagedir.log"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Account whose Pages sites are listed
    #[serde(default = "default_owner")]
    pub owner: String,

    /// API URL (for GitHub Enterprise)
    #[serde(default = "default_github_url")]
    pub api_url: String,

    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_owner() -> String {
    "Mkpb321".to_string()
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

fn default_per_page() -> u32 {
    100
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            api_url: default_github_url(),
            per_page: default_per_page(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PreferencesConfig {
    /// Override for the SQLite file holding sort/view choices
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// strftime pattern for the last-updated date
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Probe each site for a favicon
    #[serde(default = "default_resolve_favicons")]
    pub resolve_favicons: bool,
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_resolve_favicons() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            resolve_favicons: default_resolve_favicons(),
        }
    }
}
