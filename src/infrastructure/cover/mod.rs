//! Cover art acquisition.
//!
//! This module provides:
//! - HTTP download of cover images
//! - A disk cache holding one file per channel

pub mod http_fetcher;
pub mod image_cache;

pub use http_fetcher::{DEFAULT_TIMEOUT_SECS, HttpCoverFetcher};
pub use image_cache::{CACHED_EXTENSIONS, ImageCache, default_cache_dir};
