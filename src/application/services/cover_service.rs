//! Synchronous and background cover requests with change notification.
//!
//! Background requests publish a [`CoverEvent`] on completion. Requests for
//! the same channel are neither serialized nor coalesced; whichever finishes
//! last is what subscribers end up showing.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::entities::{ChannelInfo, CoverRequest};
use crate::infrastructure::cover::ImageCache;

/// Notification published to subscribers.
#[derive(Debug, Clone)]
pub enum CoverEvent {
    /// A background request finished; `image` is `None` if no cover exists.
    Available {
        /// Channel the cover belongs to.
        channel_url: String,
        /// Decoded cover.
        image: Option<Arc<image::DynamicImage>>,
    },
    /// A channel's cover was deleted.
    Removed {
        /// Channel the cover belonged to.
        channel_url: String,
    },
}

impl CoverEvent {
    /// Returns the signal name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Available { .. } => "cover-available",
            Self::Removed { .. } => "cover-removed",
        }
    }

    /// Returns the channel the event concerns.
    #[must_use]
    pub fn channel_url(&self) -> &str {
        match self {
            Self::Available { channel_url, .. } | Self::Removed { channel_url } => channel_url,
        }
    }
}

/// Front door for cover art used by the UI layer.
#[derive(Debug, Clone)]
pub struct CoverService {
    image_cache: Arc<ImageCache>,
    subscribers: Arc<Subscribers>,
}

/// Unbounded sender per subscriber, so a slow reader never loses events.
#[derive(Debug, Default)]
struct Subscribers {
    senders: Mutex<Vec<mpsc::UnboundedSender<CoverEvent>>>,
}

impl Subscribers {
    fn add(&self) -> mpsc::UnboundedReceiver<CoverEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().push(tx);
        rx
    }

    /// Delivers `event` to every live subscriber and forgets dropped ones.
    fn publish(&self, event: &CoverEvent) {
        self.senders
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    fn count(&self) -> usize {
        self.senders.lock().len()
    }
}

impl CoverService {
    /// Creates a service on top of `image_cache`.
    #[must_use]
    pub fn new(image_cache: Arc<ImageCache>) -> Self {
        Self {
            image_cache,
            subscribers: Arc::default(),
        }
    }

    /// Returns the underlying cache.
    #[must_use]
    pub const fn image_cache(&self) -> &Arc<ImageCache> {
        &self.image_cache
    }

    /// Subscribes to cover notifications.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<CoverEvent> {
        self.subscribers.add()
    }

    /// Resolves a cover and returns it to the caller. Publishes nothing.
    pub async fn get_cover(&self, request: &CoverRequest) -> Option<Arc<image::DynamicImage>> {
        self.image_cache
            .resolve(request)
            .await
            .map(|resolved| resolved.image)
    }

    /// Resolves a cover in the background and publishes `cover-available`.
    pub fn request_cover(&self, request: CoverRequest) -> JoinHandle<()> {
        debug!(channel = %request.channel_url(), "cover download request");
        let image_cache = self.image_cache.clone();
        let subscribers = self.subscribers.clone();

        tokio::spawn(async move {
            let image = image_cache
                .resolve(&request)
                .await
                .map(|resolved| resolved.image);

            let event = CoverEvent::Available {
                channel_url: request.channel_url().to_string(),
                image,
            };
            subscribers.publish(&event);
        })
    }

    /// Deletes the current cover file and requests a new one.
    ///
    /// Without `custom_url` the channel's own cover URL is refetched. If the
    /// fetch fails the channel is left without a cover.
    pub fn replace_cover(&self, channel: &ChannelInfo, custom_url: Option<String>) -> JoinHandle<()> {
        let request = CoverRequest::for_channel(channel);
        let request = match custom_url {
            Some(url) => request.with_custom_url(url),
            None => request.replacing(),
        };
        self.request_cover(request)
    }

    /// Deletes the cached cover and publishes `cover-removed`.
    pub async fn remove_cover(&self, channel_url: &str) -> bool {
        let removed = self.image_cache.remove(channel_url).await;
        self.subscribers.publish(&CoverEvent::Removed {
            channel_url: channel_url.to_string(),
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CoverError;
    use crate::domain::ports::mocks::MockCoverFetcher;
    use std::io::Cursor;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    const FEED: &str = "https://example.com/feed.xml";

    fn png_bytes(side: u32) -> Vec<u8> {
        let mut out = Vec::new();
        image::DynamicImage::new_rgb8(side, side)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn channel() -> ChannelInfo {
        ChannelInfo::new(FEED, "Example").with_cover_url("https://example.com/cover.png")
    }

    async fn create_service(fetcher: Arc<MockCoverFetcher>) -> (CoverService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = ImageCache::new(temp_dir.path().to_path_buf(), fetcher)
            .await
            .unwrap();
        (CoverService::new(Arc::new(cache)), temp_dir)
    }

    #[tokio::test]
    async fn test_get_cover_returns_image_without_event() {
        let fetcher = Arc::new(MockCoverFetcher::serving(png_bytes(6)));
        let (service, _temp) = create_service(fetcher).await;
        let mut rx = service.subscribe();

        let image = service.get_cover(&CoverRequest::for_channel(&channel())).await;

        assert_eq!(image.unwrap().width(), 6);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_request_cover_publishes_available() {
        let fetcher = Arc::new(MockCoverFetcher::serving(png_bytes(6)));
        let (service, _temp) = create_service(fetcher).await;
        let mut rx = service.subscribe();

        assert_ok!(service.request_cover(CoverRequest::for_channel(&channel())).await);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name(), "cover-available");
        assert_eq!(event.channel_url(), FEED);
        let CoverEvent::Available { image, .. } = event else {
            panic!("expected cover-available");
        };
        assert_eq!(image.unwrap().height(), 6);
    }

    #[tokio::test]
    async fn test_request_cover_publishes_none_on_failure() {
        let fetcher = Arc::new(MockCoverFetcher::failing());
        let (service, _temp) = create_service(fetcher).await;
        let mut rx = service.subscribe();

        service
            .request_cover(CoverRequest::for_channel(&channel()))
            .await
            .unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            CoverEvent::Available { image: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_request_without_subscribers_is_fine() {
        let fetcher = Arc::new(MockCoverFetcher::serving(png_bytes(6)));
        let (service, _temp) = create_service(fetcher.clone()).await;

        assert_ok!(service.request_cover(CoverRequest::for_channel(&channel())).await);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_slow_subscriber_receives_every_event() {
        let fetcher = Arc::new(MockCoverFetcher::serving(png_bytes(2)));
        let (service, _temp) = create_service(fetcher).await;
        let mut rx = service.subscribe();

        let handles: Vec<_> = (0..100)
            .map(|i| {
                let channel = ChannelInfo::new(format!("https://example.com/{i}.xml"), "Feed")
                    .with_cover_url("https://example.com/cover.png");
                service.request_cover(CoverRequest::for_channel(&channel))
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let mut received = 0;
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(event, CoverEvent::Available { image: Some(_), .. }));
            received += 1;
        }
        assert_eq!(received, 100);
    }

    #[tokio::test]
    async fn test_every_subscriber_is_notified() {
        let fetcher = Arc::new(MockCoverFetcher::serving(png_bytes(2)));
        let (service, _temp) = create_service(fetcher).await;
        let mut first = service.subscribe();
        let mut second = service.subscribe();

        assert_ok!(service.request_cover(CoverRequest::for_channel(&channel())).await);

        assert_eq!(first.recv().await.unwrap().channel_url(), FEED);
        assert_eq!(second.recv().await.unwrap().channel_url(), FEED);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_forgotten() {
        let fetcher = Arc::new(MockCoverFetcher::serving(png_bytes(2)));
        let (service, _temp) = create_service(fetcher).await;
        let kept = service.subscribe();
        drop(service.subscribe());
        assert_eq!(service.subscribers.count(), 2);

        assert_ok!(service.request_cover(CoverRequest::for_channel(&channel())).await);

        assert_eq!(service.subscribers.count(), 1);
        drop(kept);
    }

    #[tokio::test]
    async fn test_concurrent_requests_each_notify() {
        let fetcher = Arc::new(MockCoverFetcher::serving(png_bytes(6)));
        let (service, _temp) = create_service(fetcher).await;
        let mut rx = service.subscribe();

        let a = service.request_cover(CoverRequest::for_channel(&channel()));
        let b = service.request_cover(CoverRequest::for_channel(&channel()));
        a.await.unwrap();
        b.await.unwrap();

        for _ in 0..2 {
            let CoverEvent::Available { image, channel_url } = rx.recv().await.unwrap() else {
                panic!("expected cover-available");
            };
            assert_eq!(channel_url, FEED);
            assert!(image.is_some());
        }
        assert!(service.image_cache().find_cached(FEED).await.is_some());
    }

    #[tokio::test]
    async fn test_replace_cover_fails_open() {
        let fetcher = Arc::new(MockCoverFetcher::serving(png_bytes(6)));
        let (service, _temp) = create_service(fetcher.clone()).await;
        assert!(service.get_cover(&CoverRequest::for_channel(&channel())).await.is_some());
        let mut rx = service.subscribe();

        fetcher.set_fallback(Err(CoverError::Network("HTTP 500".into())));
        service
            .replace_cover(&channel(), Some("https://cdn.example.com/new.png".into()))
            .await
            .unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            CoverEvent::Available { image: None, .. }
        ));
        assert!(service.image_cache().find_cached(FEED).await.is_none());
    }

    #[tokio::test]
    async fn test_replace_cover_without_url_refetches() {
        let fetcher = Arc::new(MockCoverFetcher::serving(png_bytes(9)).then(Ok(png_bytes(3).into())));
        let (service, _temp) = create_service(fetcher.clone()).await;
        let first = service.get_cover(&CoverRequest::for_channel(&channel())).await;
        assert_eq!(first.unwrap().width(), 3);
        let mut rx = service.subscribe();

        service.replace_cover(&channel(), None).await.unwrap();

        let CoverEvent::Available { image, .. } = rx.recv().await.unwrap() else {
            panic!("expected cover-available");
        };
        assert_eq!(image.unwrap().width(), 9);
        assert_eq!(
            fetcher.urls(),
            vec!["https://example.com/cover.png".to_string(); 2]
        );
    }

    #[tokio::test]
    async fn test_remove_cover_notifies() {
        let fetcher = Arc::new(MockCoverFetcher::serving(png_bytes(6)));
        let (service, _temp) = create_service(fetcher).await;
        service.get_cover(&CoverRequest::for_channel(&channel())).await.unwrap();
        let mut rx = service.subscribe();

        assert!(service.remove_cover(FEED).await);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name(), "cover-removed");
        assert_eq!(event.channel_url(), FEED);
        assert!(service.image_cache().find_cached(FEED).await.is_none());
    }
}
