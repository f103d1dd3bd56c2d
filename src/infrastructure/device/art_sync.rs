//! Copies channel cover art next to episodes on file-based media players.
//!
//! With conversion enabled, the target is re-encoded as a square, baseline
//! image of the configured size whenever the existing file does not already
//! match. Writes are serialized per target by [`ArtLock`]; a writer that
//! finds the lock taken skips the file instead of waiting.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::domain::entities::{DeviceArtFormat, DeviceArtTarget, SyncDecision, SyncOutcome, SyncedEpisode};
use crate::domain::errors::{CoverError, CoverResult};
use crate::domain::ports::DeviceFolderResolver;
use crate::infrastructure::config::DeviceArtConfig;
use crate::infrastructure::cover::ImageCache;

use super::art_lock::ArtLock;
use super::inspect::inspect_file;

/// Cover image the fallback mode looks for in the episode's download folder.
pub const FOLDER_ART_NAME: &str = "folder.jpg";

const JPEG_QUALITY: u8 = 90;

/// Post-sync hook that keeps device cover art in shape.
#[derive(Debug)]
pub struct DeviceArtSync {
    config: DeviceArtConfig,
    image_cache: Arc<ImageCache>,
}

impl DeviceArtSync {
    /// Creates the hook.
    #[must_use]
    pub const fn new(config: DeviceArtConfig, image_cache: Arc<ImageCache>) -> Self {
        Self {
            config,
            image_cache,
        }
    }

    /// Ensures cover art exists next to `episode` on the device.
    ///
    /// Never fails: every problem is logged and reported in the outcome.
    pub async fn on_episode_synced(
        &self,
        device: &dyn DeviceFolderResolver,
        episode: &SyncedEpisode,
    ) -> SyncOutcome {
        let Some(device_folder) = device.episode_folder(episode) else {
            debug!(channel = %episode.channel.url(), "Device has no episode folder");
            return SyncOutcome::NoDeviceFolder;
        };

        if self.config.convert_and_resize_art {
            self.sync_converted(episode, &device_folder).await
        } else {
            self.sync_plain(episode, &device_folder).await
        }
    }

    async fn sync_converted(&self, episode: &SyncedEpisode, device_folder: &Path) -> SyncOutcome {
        let Some(episode_art) = self.image_cache.find_cached(episode.channel.url()).await else {
            debug!(channel = %episode.channel.url(), "No cached cover to sync");
            return SyncOutcome::NoSourceArt;
        };
        info!(path = %episode_art.display(), "episode art file");

        let target = DeviceArtTarget::from_config(
            device_folder,
            &self.config.art_name_on_device,
            self.config.convert_size,
            self.config.convert_allow_upscale_art,
        );

        tokio::task::spawn_blocking(move || convert_under_lock(&episode_art, &target))
            .await
            .unwrap_or_else(|e| SyncOutcome::Failed(format!("Sync task panicked: {e}")))
    }

    async fn sync_plain(&self, episode: &SyncedEpisode, device_folder: &Path) -> SyncOutcome {
        let Some(episode_art) = episode.download_dir().map(|dir| dir.join(FOLDER_ART_NAME)) else {
            return SyncOutcome::NoSourceArt;
        };
        let device_art = device_folder.join(&self.config.art_name_on_device);

        if !is_file(&episode_art).await {
            return SyncOutcome::NoSourceArt;
        }
        if is_file(&device_art).await {
            return SyncOutcome::AlreadyPresent;
        }

        info!(channel = %episode.channel.title(), "Fallback syncing cover art");
        match fs::copy(&episode_art, &device_art).await {
            Ok(_) => SyncOutcome::Copied,
            Err(e) => {
                warn!(path = %device_art.display(), error = %e, "Failed to copy cover art");
                SyncOutcome::Failed(e.to_string())
            }
        }
    }
}

fn convert_under_lock(episode_art: &Path, target: &DeviceArtTarget) -> SyncOutcome {
    let _lock = match ArtLock::try_acquire(&target.lock_path) {
        Ok(Some(lock)) => lock,
        Ok(None) => {
            info!(path = %target.path.display(), "Could not acquire file lock");
            return SyncOutcome::LockHeld;
        }
        Err(e) => {
            warn!(path = %target.path.display(), error = %e, "Art lock failed");
            return SyncOutcome::Failed(e.to_string());
        }
    };

    let existing = inspect_file(&target.path).unwrap_or_else(|e| {
        info!(path = %target.path.display(), error = %e, "check image error");
        None
    });

    match SyncDecision::decide(existing.as_ref(), target) {
        SyncDecision::Skip => {
            info!(path = %target.path.display(), "already exists");
            SyncOutcome::AlreadyPresent
        }
        SyncDecision::Copy => {
            info!(path = %target.path.display(), "copying");
            match write_device_art(episode_art, target) {
                Ok(()) => SyncOutcome::Copied,
                Err(e) => {
                    warn!(path = %episode_art.display(), error = %e, "image error");
                    SyncOutcome::Failed(e.to_string())
                }
            }
        }
    }
}

/// Decodes `source`, sizes it for `target` and writes it in baseline form.
///
/// The image is scaled to exactly `max_size` square when it is taller than
/// `max_size` or upscaling is allowed; otherwise it keeps its dimensions.
///
/// # Errors
/// Returns error if the source cannot be decoded or the target cannot be written.
pub fn write_device_art(source: &Path, target: &DeviceArtTarget) -> CoverResult<()> {
    let img = image::open(source)?;

    let out = if img.height() > target.max_size || target.allow_upscale {
        img.resize_exact(target.max_size, target.max_size, FilterType::Lanczos3)
    } else {
        img
    };

    let mut buffer = Cursor::new(Vec::new());
    match target.format {
        DeviceArtFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY).encode_image(&out.to_rgb8())?;
        }
        DeviceArtFormat::Png => out.write_with_encoder(PngEncoder::new(&mut buffer))?,
    }

    persist(&target.path, &buffer.into_inner())
}

fn persist(path: &Path, bytes: &[u8]) -> CoverResult<()> {
    let parent = path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let mut temp_file = tempfile::NamedTempFile::new_in(&parent)
        .map_err(|e| CoverError::io("Failed to create device art", &e))?;
    temp_file
        .write_all(bytes)
        .map_err(|e| CoverError::io("Failed to write device art", &e))?;
    temp_file
        .persist(path)
        .map_err(|e| CoverError::io("Failed to persist device art", &e.error))?;
    Ok(())
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}
