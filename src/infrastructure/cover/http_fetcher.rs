//! `reqwest`-backed cover downloader.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::entities::BasicAuth;
use crate::domain::errors::{CoverError, CoverResult};
use crate::domain::ports::{CoverFetcher, FetchedCover};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Downloads covers over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpCoverFetcher {
    http_client: reqwest::Client,
}

impl HttpCoverFetcher {
    /// Creates a fetcher with the given timeout and user agent.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> CoverResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| CoverError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl CoverFetcher for HttpCoverFetcher {
    async fn fetch(&self, url: &str, auth: Option<&BasicAuth>) -> CoverResult<FetchedCover> {
        debug!(url = %url, authenticated = auth.is_some(), "Downloading cover");

        let mut request = self.http_client.get(url);
        if let Some(auth) = auth {
            request = request.basic_auth(auth.username(), Some(auth.password()));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CoverError::Network(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CoverError::Network(format!(
                "HTTP {}: {}",
                response.status(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoverError::Network(format!("Failed to read body: {e}")))?;

        if bytes.is_empty() {
            return Err(CoverError::Network(format!("Empty response from {url}")));
        }

        Ok(FetchedCover {
            bytes,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        let fetcher = HttpCoverFetcher::new(DEFAULT_TIMEOUT_SECS, "podart-test/0.1");
        assert!(fetcher.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let fetcher = HttpCoverFetcher::new(2, "podart-test/0.1").unwrap();
        let result = fetcher.fetch("http://127.0.0.1:9/cover.jpg", None).await;
        assert!(result.unwrap_err().is_network());
    }
}
