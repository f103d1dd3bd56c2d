//! Domain types for cover requests and resolved covers.

use std::path::PathBuf;
use std::sync::Arc;

use super::channel::{BasicAuth, ChannelInfo};

/// Stable on-disk identifier for a channel's cover.
/// Generated from a hash of the channel URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoverId(String);

impl CoverId {
    /// Creates a `CoverId` from a channel URL by hashing it.
    #[must_use]
    pub fn from_channel_url(url: &str) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let result = hasher.finalize();
        Self(hex::encode(&result[..16]))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What to fetch for a channel cover. Immutable once built.
#[derive(Debug, Clone)]
pub struct CoverRequest {
    channel_url: String,
    title: String,
    cover_url: Option<String>,
    custom_url: Option<String>,
    auth: Option<BasicAuth>,
    allow_network: bool,
    replace: bool,
}

impl CoverRequest {
    /// Builds a network-enabled request from a channel record.
    #[must_use]
    pub fn for_channel(channel: &ChannelInfo) -> Self {
        Self {
            channel_url: channel.url().to_string(),
            title: channel.title().to_string(),
            cover_url: channel.cover_url().map(String::from),
            custom_url: None,
            auth: channel.auth().cloned(),
            allow_network: true,
            replace: false,
        }
    }

    /// Restricts the request to covers already on disk.
    #[must_use]
    pub fn cache_only(mut self) -> Self {
        self.allow_network = false;
        self
    }

    /// Fetches from `url` instead of the feed's cover URL.
    /// Implies replacing any cached copy.
    #[must_use]
    pub fn with_custom_url(mut self, url: impl Into<String>) -> Self {
        self.custom_url = Some(url.into());
        self.replace = true;
        self
    }

    /// Discards any cached copy before fetching.
    #[must_use]
    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }

    /// Returns the channel URL this request belongs to.
    #[must_use]
    pub fn channel_url(&self) -> &str {
        &self.channel_url
    }

    /// Returns the channel title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the URL to download from: the override, else the feed cover.
    #[must_use]
    pub fn fetch_url(&self) -> Option<&str> {
        self.custom_url.as_deref().or(self.cover_url.as_deref())
    }

    /// Returns the feed credentials.
    #[must_use]
    pub const fn auth(&self) -> Option<&BasicAuth> {
        self.auth.as_ref()
    }

    /// Returns true if a network fetch is permitted.
    #[must_use]
    pub const fn allow_network(&self) -> bool {
        self.allow_network
    }

    /// Returns true if the cached copy must be discarded first.
    #[must_use]
    pub const fn is_replace(&self) -> bool {
        self.replace
    }
}

/// A cover that decoded successfully from a local file.
#[derive(Debug, Clone)]
pub struct ResolvedCover {
    /// File the image was decoded from.
    pub path: PathBuf,
    /// Decoded image.
    pub image: Arc<image::DynamicImage>,
    /// False when `path` is the bundled placeholder.
    pub from_cache_dir: bool,
}
