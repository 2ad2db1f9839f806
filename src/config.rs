//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\songbook-import\config.toml
//! - macOS: ~/Library/Application Support/songbook-import/config.toml
//! - Linux: ~/.config/songbook-import/config.toml
//!
//! A different file can be passed with `--config`. Every value has a
//! built-in default, and command-line flags override what the file says.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spreadsheet to import from
    pub source: SourceConfig,

    /// SQLite catalog
    pub database: DatabaseConfig,

    /// Flat JSON catalog
    pub json: JsonConfig,

    /// Key-value storage snapshot
    pub storage: StorageConfig,
}

/// Spreadsheet source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Path to the workbook
    pub path: PathBuf,

    /// Worksheet name (first sheet when unset)
    pub sheet: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sarkilar_ve_akorlar.xlsx"),
            sheet: None,
        }
    }
}

/// Database sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("songs.db"),
        }
    }
}

/// Flat JSON file sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonConfig {
    /// JSON file holding the array of songs
    pub path: PathBuf,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("songs.json"),
        }
    }
}

/// Key-value storage sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage directory
    pub dir: PathBuf,

    /// Storage key; also the file name inside `dir`
    pub key: String,

    /// Manifest file name inside `dir`
    pub manifest: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            key: "songs".to_string(),
            manifest: "manifest.json".to_string(),
        }
    }
}

/// Where the Expo development client keeps its async storage.
fn default_storage_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".expo")
        .join("async-storage")
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songbook-import"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location.
///
/// Returns default config if the location is unknown.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!(target: "config", "Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from `path`.
///
/// Returns default config if the file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::debug!(target: "config", path = %path.display(), "No config file found, using defaults");
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!(target: "config", path = %path.display(), "Loaded config");
                config
            }
            Err(e) => {
                tracing::error!(target: "config", path = %path.display(), error = %e, "Failed to parse config file");
                tracing::warn!(target: "config", "Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!(target: "config", path = %path.display(), error = %e, "Failed to read config file");
            Config::default()
        }
    }
}

/// Save configuration to `path`.
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!(target: "config", path = %path.display(), "Saved config");
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
