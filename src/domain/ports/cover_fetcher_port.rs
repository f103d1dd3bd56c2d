//! Port definition for downloading cover bytes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::entities::BasicAuth;
use crate::domain::errors::CoverResult;

/// Raw cover payload as downloaded.
#[derive(Debug, Clone)]
pub struct FetchedCover {
    /// Response body.
    pub bytes: Bytes,
    /// `Content-Type` header, when the server sent one.
    pub content_type: Option<String>,
}

/// Port for fetching cover images over the network.
/// Implementations must be thread-safe.
#[async_trait]
pub trait CoverFetcher: Send + Sync {
    /// Downloads the image at `url`.
    async fn fetch(&self, url: &str, auth: Option<&BasicAuth>) -> CoverResult<FetchedCover>;
}
