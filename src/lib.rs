//! podart - podcast cover art cache and device art sync.
//!
//! This crate resolves channel covers to local files, notifies subscribers
//! when background requests finish, and keeps normalized cover art next to
//! episodes on file-based media players.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing services.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for the network, disk and devices.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "podart";
