//! Port for locating an episode's folder on a sync device.

use std::path::PathBuf;

use crate::domain::entities::SyncedEpisode;

/// Maps a synced episode to its destination directory on the device.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceFolderResolver: Send + Sync {
    /// Returns `None` when the device has no per-episode folder concept.
    fn episode_folder(&self, episode: &SyncedEpisode) -> Option<PathBuf>;
}

/// Resolver that places every episode in one fixed folder.
#[derive(Debug, Clone)]
pub struct FixedFolder(pub PathBuf);

impl DeviceFolderResolver for FixedFolder {
    fn episode_folder(&self, _episode: &SyncedEpisode) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}
