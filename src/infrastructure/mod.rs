//! Infrastructure layer with filesystem, network and device adapters.

/// Application configuration.
pub mod config;
/// Cover download and disk cache.
pub mod cover;
/// Device art sync.
pub mod device;

pub use config::{AppConfig, CliArgs, Command, DeviceArtConfig, LogLevel, StorageManager};
pub use cover::{HttpCoverFetcher, ImageCache};
pub use device::DeviceArtSync;
