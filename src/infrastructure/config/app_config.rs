//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::infrastructure::cover::{DEFAULT_TIMEOUT_SECS, default_cache_dir};

const APP_NAME: &str = "podart";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Cover cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// HTTP configuration.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Device art sync configuration.
    #[serde(default)]
    pub device_art: DeviceArtConfig,
}

/// Cover cache configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory; defaults to the platform cache dir.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Image shown when a channel has no cover.
    #[serde(default)]
    pub placeholder: Option<PathBuf>,
}

impl CacheConfig {
    /// Returns the directory covers are stored in.
    #[must_use]
    pub fn effective_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(default_cache_dir)
    }
}

/// HTTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `User-Agent` header sent with cover requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Cover art handling for file-based media players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceArtConfig {
    /// Convert, resize and make baseline; when off, plain `folder.jpg` copy.
    #[serde(default = "default_true")]
    pub convert_and_resize_art: bool,

    /// Target image size in pixels.
    #[serde(default = "default_convert_size")]
    pub convert_size: u32,

    /// Scale smaller images up to `convert_size`.
    #[serde(default)]
    pub convert_allow_upscale_art: bool,

    /// File name written next to episodes on the device.
    #[serde(default = "default_art_name")]
    pub art_name_on_device: String,
}

impl Default for DeviceArtConfig {
    fn default() -> Self {
        Self {
            convert_and_resize_art: true,
            convert_size: default_convert_size(),
            convert_allow_upscale_art: false,
            art_name_on_device: default_art_name(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_convert_size() -> u32 {
    500
}

fn default_art_name() -> String {
    "cover.jpg".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("{APP_NAME}/{}", crate::VERSION)
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache.directory = Some(cache_dir.clone());
        }
        if let Some(timeout) = args.timeout {
            self.network.timeout_secs = timeout;
        }
    }

    /// Returns effective log path, if file logging is enabled.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LogLevel::Info,
            cache: CacheConfig::default(),
            network: NetworkConfig::default(),
            device_art: DeviceArtConfig::default(),
        }
    }
}
