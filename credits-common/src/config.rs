//! Configuration loading and data folder resolution
//!
//! Settings are resolved per value in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: a warning is logged and the
//! compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CREDITS_NOTICE_CONFIG";
/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "CREDITS_NOTICE_DATA_FOLDER";
/// Environment variable overriding the MusicBrainz server
pub const BASE_URL_ENV: &str = "CREDITS_NOTICE_BASE_URL";

const APP_DIR: &str = "credits-notice";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Remote entity server settings
    #[serde(default)]
    pub musicbrainz: MusicBrainzConfig,

    /// Where persisted caches live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote entity server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MusicBrainzConfig {
    /// Server root, e.g. `https://musicbrainz.org`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum interval between two remote requests
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Total request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            rate_limit_ms: default_rate_limit_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Folder holding the persisted store (optional)
    #[serde(default)]
    pub data_folder: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    "https://musicbrainz.org".to_string()
}

fn default_user_agent() -> String {
    format!("credits-notice/{} ( https://github.com/credits-notice )", env!("CARGO_PKG_VERSION"))
}

fn default_rate_limit_ms() -> u64 {
    1000 // 1 request per second
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration following the priority order
    ///
    /// An explicitly requested file (CLI or [`CONFIG_ENV`]) must exist and parse.
    /// The platform default file is optional.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = cli_path {
            Self::from_file(path)?
        } else if let Ok(path) = std::env::var(CONFIG_ENV) {
            Self::from_file(Path::new(&path))?
        } else {
            match default_config_path() {
                Some(path) if path.exists() => {
                    info!("Loading config from {}", path.display());
                    Self::from_file(&path)?
                }
                _ => {
                    warn!("No config file found, using compiled defaults");
                    Self::default()
                }
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables override values read from TOML
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                self.musicbrainz.base_url = base_url.trim().to_string();
            }
        }
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.musicbrainz.base_url.trim().is_empty() {
            return Err(Error::Config("musicbrainz.base_url must not be empty".to_string()));
        }
        if self.musicbrainz.rate_limit_ms == 0 {
            return Err(Error::Config("musicbrainz.rate_limit_ms must be at least 1".to_string()));
        }
        if self.musicbrainz.request_timeout_secs == 0 {
            return Err(Error::Config(
                "musicbrainz.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Platform config file location, e.g. `~/.config/credits-notice/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Resolve the data folder: CLI → ENV → TOML → platform default
pub fn resolve_data_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.storage.data_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_data_folder()
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./credits_notice_data"))
}
