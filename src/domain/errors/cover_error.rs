//! Cover pipeline error types.

use thiserror::Error;

/// Result type for cover operations.
pub type CoverResult<T> = std::result::Result<T, CoverError>;

/// Errors that can occur while resolving or syncing cover art.
#[derive(Debug, Clone, Error)]
pub enum CoverError {
    /// No cover available for the channel.
    #[error("no cover available: {0}")]
    NotFound(String),
    /// Failed to decode image.
    #[error("decode error: {0}")]
    Decode(String),
    /// Failed to encode image.
    #[error("encode error: {0}")]
    Encode(String),
    /// I/O error during cache or device operation.
    #[error("io error: {0}")]
    Io(String),
    /// Network error during download.
    #[error("network error: {0}")]
    Network(String),
    /// Advisory lock could not be taken.
    #[error("lock error: {0}")]
    Lock(String),
}

impl CoverError {
    /// Creates an I/O error with context.
    #[must_use]
    pub fn io(context: &str, err: &std::io::Error) -> Self {
        Self::Io(format!("{context}: {err}"))
    }

    /// Returns true for transport-level failures.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<image::ImageError> for CoverError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => Self::Encode(e.to_string()),
            image::ImageError::IoError(e) => Self::Io(e.to_string()),
            other => Self::Decode(other.to_string()),
        }
    }
}
