//! Configuration file parser for ~/.config/parentsku/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted but logged as warnings, since they are usually
//! typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),

    #[error("HOME environment variable not set")]
    NoHome,
}

// ============================================================================
// Configuration
// ============================================================================

/// Settings shared by the feed processor and the image downloader.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Relative directories are resolved against the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving the CSV export and the image list.
    pub output_dir: PathBuf,

    /// File name of the CSV export inside `output_dir`.
    pub csv_file_name: String,

    /// File name of the `sku|url` list inside `output_dir`.
    pub image_list_file_name: String,

    /// Root directory for downloaded images (one subdirectory per SKU).
    pub image_dir: PathBuf,

    /// Pause between two image requests, in milliseconds.
    pub request_delay_ms: u64,

    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            csv_file_name: "sku_pai.csv".to_string(),
            image_list_file_name: "lista_imagens.txt".to_string(),
            image_dir: PathBuf::from("imagens"),
            request_delay_ms: 100,
            request_timeout_secs: 15,
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "output_dir",
        "csv_file_name",
        "image_list_file_name",
        "image_dir",
        "request_delay_ms",
        "request_timeout_secs",
    ];

    /// Default config location: `$HOME/.config/parentsku/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var_os("HOME").ok_or(ConfigError::NoHome)?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("parentsku")
            .join("config.toml"))
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    /// - `request_timeout_secs = 0` → `Err(ConfigError::Invalid)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        if config.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Loads from [`Config::default_path`], falling back to defaults when
    /// `HOME` is unset.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Ok(path) => Self::load(&path),
            Err(ConfigError::NoHome) => {
                tracing::debug!("HOME not set, using default configuration");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.csv_file_name)
    }

    pub fn image_list_path(&self) -> PathBuf {
        self.output_dir.join(&self.image_list_file_name)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
