//! Channel and episode input records.

use std::fmt;
use std::path::{Path, PathBuf};

use zeroize::{Zeroize, ZeroizeOnDrop};

/// HTTP basic-auth credentials attached to a feed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    /// Creates credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A subscribed podcast feed, as far as cover handling is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    url: String,
    title: String,
    cover_url: Option<String>,
    auth: Option<BasicAuth>,
}

impl ChannelInfo {
    /// Creates a channel record keyed by its feed URL.
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            cover_url: None,
            auth: None,
        }
    }

    /// Sets the cover URL from the feed metadata.
    #[must_use]
    pub fn with_cover_url(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    /// Sets basic-auth credentials.
    #[must_use]
    pub fn with_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Returns the feed URL, which doubles as the stable identifier.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the cover URL, if the feed advertises one.
    #[must_use]
    pub fn cover_url(&self) -> Option<&str> {
        self.cover_url.as_deref()
    }

    /// Returns the feed credentials.
    #[must_use]
    pub const fn auth(&self) -> Option<&BasicAuth> {
        self.auth.as_ref()
    }
}

/// An episode that has just been transferred to a device.
#[derive(Debug, Clone)]
pub struct SyncedEpisode {
    /// Owning channel.
    pub channel: ChannelInfo,
    /// Downloaded file on the local disk.
    pub local_path: PathBuf,
}

impl SyncedEpisode {
    /// Creates a synced episode record.
    #[must_use]
    pub fn new(channel: ChannelInfo, local_path: impl Into<PathBuf>) -> Self {
        Self {
            channel,
            local_path: local_path.into(),
        }
    }

    /// Returns the local download directory of the episode.
    #[must_use]
    pub fn download_dir(&self) -> Option<&Path> {
        self.local_path.parent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_password() {
        let auth = BasicAuth::new("alice", "hunter2");
        let printed = format!("{auth:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_download_dir() {
        let episode = SyncedEpisode::new(
            ChannelInfo::new("https://example.com/feed", "Feed"),
            "/home/user/gPodder/Downloads/Feed/episode.mp3",
        );
        assert_eq!(
            episode.download_dir(),
            Some(Path::new("/home/user/gPodder/Downloads/Feed"))
        );
    }
}
