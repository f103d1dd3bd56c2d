//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{AppConfig, CacheConfig, DeviceArtConfig, LogLevel, NetworkConfig};
pub use args::{CliArgs, Command, FeedArgs};
pub use storage::{ConfigError, StorageManager};
