//! Device cover-art targets and the copy decision.

use std::fmt;
use std::path::{Path, PathBuf};

use image::ImageFormat;

/// Extensions accepted for the on-device art file.
const ALLOWED_EXTENSIONS: [&str; 3] = ["jpeg", "jpg", "png"];

/// Extension used when the configured one is not allowed.
const FALLBACK_EXTENSION: &str = "jpg";

/// Suffix of the advisory lock file next to a target.
pub const LOCK_SUFFIX: &str = ".lock";

/// Output encoding for device art.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceArtFormat {
    /// Baseline JPEG.
    Jpeg,
    /// Non-interlaced PNG.
    Png,
}

impl DeviceArtFormat {
    /// Maps a validated extension to its format. `jpg` and `jpeg` are the same.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("png") {
            Self::Png
        } else {
            Self::Jpeg
        }
    }

    /// Returns the decoder format this corresponds to.
    #[must_use]
    pub const fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// Where and how a cover should land on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceArtTarget {
    /// Final file path on the device.
    pub path: PathBuf,
    /// Companion advisory lock path.
    pub lock_path: PathBuf,
    /// Desired encoding.
    pub format: DeviceArtFormat,
    /// Desired height (and width) in pixels.
    pub max_size: u32,
    /// Whether smaller images are scaled up to `max_size`.
    pub allow_upscale: bool,
}

impl DeviceArtTarget {
    /// Builds the target for `device_folder` from the configured art name.
    ///
    /// Extensions outside {jpeg, jpg, png} fall back to `jpg`.
    #[must_use]
    pub fn from_config(
        device_folder: &Path,
        art_name: &str,
        max_size: u32,
        allow_upscale: bool,
    ) -> Self {
        let (stem, ext) = split_art_name(art_name);
        let extension = if ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        {
            ext.to_string()
        } else {
            FALLBACK_EXTENSION.to_string()
        };

        let path = device_folder.join(format!("{stem}.{extension}"));
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(LOCK_SUFFIX);

        Self {
            format: DeviceArtFormat::from_extension(&extension),
            lock_path: PathBuf::from(lock_path),
            path,
            max_size,
            allow_upscale,
        }
    }
}

fn split_art_name(art_name: &str) -> (&str, &str) {
    let (stem, ext) = art_name.rsplit_once('.').unwrap_or((art_name, ""));
    if stem.is_empty() {
        ("cover", ext)
    } else {
        (stem, ext)
    }
}

/// What an existing device file looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtInspection {
    /// Pixel height.
    pub height: u32,
    /// Format reported by the decoder.
    pub format: Option<ImageFormat>,
    /// Progressive JPEG or interlaced PNG.
    pub progressive: bool,
}

/// Whether the device file must be (re)written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// Write the target.
    Copy,
    /// Leave the target alone.
    Skip,
}

impl SyncDecision {
    /// Decides from the inspected file (`None` when missing or unreadable).
    #[must_use]
    pub fn decide(existing: Option<&ArtInspection>, target: &DeviceArtTarget) -> Self {
        let Some(art) = existing else {
            return Self::Copy;
        };

        let wrong_size = if target.allow_upscale {
            art.height != target.max_size
        } else {
            art.height > target.max_size
        };

        if wrong_size || art.format != Some(target.format.image_format()) || art.progressive {
            Self::Copy
        } else {
            Self::Skip
        }
    }
}

/// Result of syncing art for one episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Art was written to the device.
    Copied,
    /// The device already had acceptable art.
    AlreadyPresent,
    /// Another writer holds the lock for this target.
    LockHeld,
    /// No source cover to copy from.
    NoSourceArt,
    /// The device could not name a folder for the episode.
    NoDeviceFolder,
    /// Inspection or copy failed; the device was left unchanged.
    Failed(String),
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copied => write!(f, "copied"),
            Self::AlreadyPresent => write!(f, "already present"),
            Self::LockHeld => write!(f, "lock held by another writer"),
            Self::NoSourceArt => write!(f, "no source art"),
            Self::NoDeviceFolder => write!(f, "no device folder"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn target(name: &str, max_size: u32, allow_upscale: bool) -> DeviceArtTarget {
        DeviceArtTarget::from_config(Path::new("/media/player/Podcasts/Show"), name, max_size, allow_upscale)
    }

    fn baseline(height: u32, format: ImageFormat) -> ArtInspection {
        ArtInspection {
            height,
            format: Some(format),
            progressive: false,
        }
    }

    #[test_case("cover.jpg", "cover.jpg", DeviceArtFormat::Jpeg ; "jpg")]
    #[test_case("cover.JPG", "cover.JPG", DeviceArtFormat::Jpeg ; "upper case jpg")]
    #[test_case("cover.jpeg", "cover.jpeg", DeviceArtFormat::Jpeg ; "jpeg")]
    #[test_case("folder.png", "folder.png", DeviceArtFormat::Png ; "png")]
    #[test_case("cover.bmp", "cover.jpg", DeviceArtFormat::Jpeg ; "bmp falls back")]
    #[test_case("cover", "cover.jpg", DeviceArtFormat::Jpeg ; "no extension")]
    #[test_case("album.art.webp", "album.art.jpg", DeviceArtFormat::Jpeg ; "dotted stem")]
    fn test_extension_policy(name: &str, file_name: &str, format: DeviceArtFormat) {
        let t = target(name, 500, false);
        assert_eq!(t.path.file_name().and_then(|n| n.to_str()), Some(file_name));
        assert_eq!(t.format, format);
    }

    #[test]
    fn test_jpg_and_jpeg_match_the_same_decoder_format() {
        let upper = target("cover.JPG", 500, false);
        let long = target("cover.jpeg", 500, false);
        let art = baseline(500, ImageFormat::Jpeg);

        assert_eq!(upper.format, long.format);
        assert_eq!(SyncDecision::decide(Some(&art), &upper), SyncDecision::Skip);
        assert_eq!(SyncDecision::decide(Some(&art), &long), SyncDecision::Skip);
    }

    #[test]
    fn test_lock_path_is_suffixed() {
        let t = target("cover.jpg", 500, false);
        assert_eq!(t.lock_path, PathBuf::from("/media/player/Podcasts/Show/cover.jpg.lock"));
    }

    #[test]
    fn test_missing_file_is_copied() {
        assert_eq!(SyncDecision::decide(None, &target("cover.jpg", 500, false)), SyncDecision::Copy);
    }

    #[test_case(500, false, SyncDecision::Skip ; "exact size")]
    #[test_case(300, false, SyncDecision::Skip ; "smaller without upscale")]
    #[test_case(800, false, SyncDecision::Copy ; "too tall without upscale")]
    #[test_case(300, true, SyncDecision::Copy ; "smaller with upscale")]
    #[test_case(800, true, SyncDecision::Copy ; "too tall with upscale")]
    #[test_case(500, true, SyncDecision::Skip ; "exact size with upscale")]
    fn test_size_policy(height: u32, allow_upscale: bool, expected: SyncDecision) {
        let t = target("cover.jpg", 500, allow_upscale);
        let art = baseline(height, ImageFormat::Jpeg);
        assert_eq!(SyncDecision::decide(Some(&art), &t), expected);
    }

    #[test]
    fn test_format_mismatch_is_copied() {
        let t = target("cover.jpg", 500, false);
        let art = baseline(500, ImageFormat::Png);
        assert_eq!(SyncDecision::decide(Some(&art), &t), SyncDecision::Copy);
    }

    #[test]
    fn test_progressive_is_copied() {
        let t = target("cover.jpg", 500, false);
        let art = ArtInspection {
            progressive: true,
            ..baseline(500, ImageFormat::Jpeg)
        };
        assert_eq!(SyncDecision::decide(Some(&art), &t), SyncDecision::Copy);
    }
}
