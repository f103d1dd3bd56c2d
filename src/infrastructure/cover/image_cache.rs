//! Disk-backed cover cache with single-retry corruption recovery.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, error, info, trace, warn};

use crate::domain::entities::{CoverId, CoverRequest, ResolvedCover};
use crate::domain::errors::{CoverError, CoverResult};
use crate::domain::ports::{CoverFetcher, FetchedCover};

/// Extensions a cached cover may carry, in lookup order.
pub const CACHED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "ico"];

/// Extension used when neither the bytes nor the URL reveal one.
const DEFAULT_EXTENSION: &str = "jpg";

/// Maps channels to cover files under one directory, one file per channel.
pub struct ImageCache {
    cache_dir: PathBuf,
    fetcher: Arc<dyn CoverFetcher>,
    placeholder: Option<PathBuf>,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("cache_dir", &self.cache_dir)
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    /// Creates a cache in the specified directory.
    ///
    /// # Errors
    /// Returns error if the cache directory cannot be created.
    pub async fn new(cache_dir: PathBuf, fetcher: Arc<dyn CoverFetcher>) -> CoverResult<Self> {
        fs::create_dir_all(&cache_dir)
            .await
            .map_err(|e| CoverError::io("Failed to create cache dir", &e))?;

        Ok(Self {
            cache_dir,
            fetcher,
            placeholder: None,
        })
    }

    /// Sets a bundled image returned when no cover can be found.
    #[must_use]
    pub fn with_placeholder(mut self, path: impl Into<PathBuf>) -> Self {
        self.placeholder = Some(path.into());
        self
    }

    /// Returns the extension-less path for a channel's cover.
    #[must_use]
    pub fn cover_stem(&self, channel_url: &str) -> PathBuf {
        self.cache_dir
            .join(CoverId::from_channel_url(channel_url).as_str())
    }

    /// Finds the cached cover file for a channel, whatever its extension.
    pub async fn find_cached(&self, channel_url: &str) -> Option<PathBuf> {
        let stem = self.cover_stem(channel_url);
        for ext in CACHED_EXTENSIONS {
            let path = stem.with_extension(ext);
            if fs::try_exists(&path).await.unwrap_or(false) {
                return Some(path);
            }
        }
        None
    }

    /// Returns a local file for the request, downloading it if needed.
    ///
    /// Network failures are logged and yield the placeholder (or `None`).
    pub async fn cover_file(&self, request: &CoverRequest) -> Option<PathBuf> {
        self.fetch_step(request, false).await.ok().flatten()
    }

    /// Resolves and decodes a cover. Failures degrade to `None`.
    pub async fn resolve(&self, request: &CoverRequest) -> Option<ResolvedCover> {
        match self.resolve_with(request, false).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(channel = %request.channel_url(), error = %e, "Cover resolution failed");
                None
            }
        }
    }

    /// Resolves and decodes a cover, surfacing network errors.
    ///
    /// # Errors
    /// Returns the fetch error, or `NotFound` when no cover is available.
    pub async fn resolve_strict(&self, request: &CoverRequest) -> CoverResult<ResolvedCover> {
        self.resolve_with(request, true)
            .await?
            .ok_or_else(|| CoverError::NotFound(request.channel_url().to_string()))
    }

    async fn resolve_with(
        &self,
        request: &CoverRequest,
        strict: bool,
    ) -> CoverResult<Option<ResolvedCover>> {
        if request.is_replace() {
            let removed = self.delete_variants(request.channel_url()).await;
            if removed > 0 {
                info!(channel = %request.channel_url(), removed, "Replacing cover");
            }
        }

        // One retry after deleting a broken file, never more.
        for attempt in 0..2 {
            let Some(path) = self.fetch_step(request, strict).await? else {
                return Ok(None);
            };

            match decode_file(&path).await {
                Ok(image) => {
                    return Ok(Some(ResolvedCover {
                        from_cache_dir: self.is_managed(&path),
                        path,
                        image,
                    }));
                }
                Err(e) if !self.is_managed(&path) => {
                    warn!(path = %path.display(), error = %e, "Cannot load cover art");
                    return Ok(None);
                }
                Err(e) if attempt == 0 => {
                    warn!(path = %path.display(), error = %e, "Cannot load cover art");
                    info!(path = %path.display(), "Deleting broken cover");
                    delete_file(&path).await;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt cover art on server, deleting");
                    delete_file(&path).await;
                }
            }
        }

        Ok(None)
    }

    async fn fetch_step(&self, request: &CoverRequest, strict: bool) -> CoverResult<Option<PathBuf>> {
        if let Some(path) = self.find_cached(request.channel_url()).await {
            trace!(channel = %request.channel_url(), path = %path.display(), "Cover cache hit");
            return Ok(Some(path));
        }

        if request.allow_network()
            && let Some(url) = request.fetch_url()
        {
            match self.download(request, url).await {
                Ok(path) => return Ok(Some(path)),
                Err(e) if strict => return Err(e),
                Err(e) => {
                    warn!(channel = %request.channel_url(), url = %url, error = %e, "Cover download failed");
                }
            }
        } else {
            trace!(channel = %request.channel_url(), "Cover cache miss");
        }

        Ok(self.placeholder.clone())
    }

    async fn download(&self, request: &CoverRequest, url: &str) -> CoverResult<PathBuf> {
        debug!(channel = %request.channel_url(), title = %request.title(), url = %url, "Fetching cover");
        let fetched = self.fetcher.fetch(url, request.auth()).await?;

        let ext = detect_extension(&fetched, url);
        let path = self.cover_stem(request.channel_url()).with_extension(ext);
        let size = fetched.bytes.len();

        let dir = self.cache_dir.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || persist_bytes(&dir, &target, &fetched.bytes))
            .await
            .map_err(|e| CoverError::Io(format!("Write task panicked: {e}")))??;

        debug!(path = %path.display(), size = size, "Stored cover in cache");
        Ok(path)
    }

    /// Removes a channel's cached cover. Returns true if a file was deleted.
    pub async fn remove(&self, channel_url: &str) -> bool {
        self.delete_variants(channel_url).await > 0
    }

    /// Deletes the channel's cover under every cached extension.
    async fn delete_variants(&self, channel_url: &str) -> usize {
        let stem = self.cover_stem(channel_url);
        let mut removed = 0;
        for ext in CACHED_EXTENSIONS {
            if delete_file(&stem.with_extension(ext)).await {
                removed += 1;
            }
        }
        removed
    }

    /// Deletes every cached cover.
    ///
    /// # Errors
    /// Returns error if the cache directory cannot be read.
    pub async fn clear(&self) -> CoverResult<usize> {
        let mut entries = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| CoverError::io("Failed to read cache dir", &e))?;

        let mut removed = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoverError::io("Failed to read entry", &e))?
        {
            let path = entry.path();
            if has_cached_extension(&path) && delete_file(&path).await {
                removed += 1;
            }
        }

        debug!(removed = removed, "Cleared cover cache");
        Ok(removed)
    }

    fn is_managed(&self, path: &Path) -> bool {
        path.starts_with(&self.cache_dir)
    }
}

fn persist_bytes(dir: &Path, target: &Path, bytes: &[u8]) -> CoverResult<()> {
    let mut temp_file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| CoverError::io("Failed to create cache file", &e))?;
    temp_file
        .write_all(bytes)
        .map_err(|e| CoverError::io("Failed to write cache file", &e))?;
    temp_file
        .persist(target)
        .map_err(|e| CoverError::io("Failed to persist cache file", &e.error))?;
    Ok(())
}

async fn decode_file(path: &Path) -> CoverResult<Arc<image::DynamicImage>> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| CoverError::io("Failed to read cover", &e))?;

    let result = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await;

    match result {
        Ok(Ok(img)) => Ok(Arc::new(img)),
        Ok(Err(e)) => Err(CoverError::Decode(e.to_string())),
        Err(e) => {
            error!(error = %e, "Decode task panicked");
            Err(CoverError::Decode(format!("Decode task panicked: {e}")))
        }
    }
}

/// Deletes a file, logging anything but `NotFound`. Returns true on removal.
async fn delete_file(path: &Path) -> bool {
    match fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to delete cover");
            }
            false
        }
    }
}

fn has_cached_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CACHED_EXTENSIONS.contains(&ext))
}

/// Picks the cache file extension from content, then `Content-Type`, then URL.
fn detect_extension(fetched: &FetchedCover, url: &str) -> &'static str {
    if let Ok(format) = image::guess_format(&fetched.bytes)
        && let Some(ext) = format
            .extensions_str()
            .first()
            .and_then(|ext| known_extension(ext))
    {
        return ext;
    }

    let from_content_type = fetched.content_type.as_deref().and_then(|ctype| {
        let mime = ctype.split(';').next().unwrap_or_default().trim();
        match mime {
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            "image/bmp" => Some("bmp"),
            "image/x-icon" | "image/vnd.microsoft.icon" => Some("ico"),
            _ => None,
        }
    });
    if let Some(ext) = from_content_type {
        return ext;
    }

    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit_once('.')
        .and_then(|(_, ext)| known_extension(&ext.to_ascii_lowercase()))
        .unwrap_or(DEFAULT_EXTENSION)
}

fn known_extension(ext: &str) -> Option<&'static str> {
    CACHED_EXTENSIONS.iter().copied().find(|known| *known == ext)
}

/// Returns the default cache directory path.
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "podart", "podart").map_or_else(
        || std::env::temp_dir().join("podart").join("cache").join("covers"),
        |dirs| dirs.cache_dir().join("covers"),
    )
}
