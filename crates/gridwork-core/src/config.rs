//! Configuration types.
//!
//! Grid appearance is configured through a TOML file in the platform config
//! directory. All fields are optional; the defaults render a plain table.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Runtime configuration loaded from gridwork.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridConfig {
    /// Appearance settings
    #[serde(default)]
    pub appearance: AppearanceConfig,
}

/// Appearance configuration for text rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppearanceConfig {
    /// Theme mode: "light", "dark", or "system"
    #[serde(default)]
    pub theme: ThemeMode,

    /// Separator between cells in a rendered row.
    #[serde(default = "default_column_separator")]
    pub column_separator: String,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            column_separator: default_column_separator(),
        }
    }
}

fn default_column_separator() -> String {
    " | ".to_string()
}

/// Theme mode selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

/// Get the config directory path.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gridwork"))
}

/// Get the path to gridwork.toml.
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("gridwork.toml"))
}

/// Ensure the config directory exists.
pub fn ensure_config_dir() -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Load configuration from the default location.
///
/// A missing file is not an error; defaults are returned.
pub fn load_config() -> Result<GridConfig, ConfigError> {
    let path = config_file_path().ok_or(ConfigError::NoConfigDir)?;
    if !path.exists() {
        return Ok(GridConfig::default());
    }
    load_config_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Result<GridConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
    toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))
}
