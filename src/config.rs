use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;

use crate::theme::ThemeConfig;

pub const APP_DIR: &str = "remind-tui";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub notifications: NotificationConfig,
    pub theme: ThemeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            notifications: NotificationConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// `None` means ask once on launch.
    pub enabled: Option<bool>,
    /// Desktop command, run with `sh -c`. Sees `REMINDER_ID`,
    /// `REMINDER_TITLE` and `REMINDER_MESSAGE`.
    pub command: Option<String>,
    /// Ring the terminal bell when a reminder fires.
    pub bell: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            command: None,
            bell: true,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when there is
    /// no config file.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        Self::parse(&content).wrap_err_with(|| format!("parsing {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

pub fn log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR).join("remind.log"))
}
