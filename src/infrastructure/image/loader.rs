//! Async poster loading: memory cache first, then the network.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, WeakShared};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::domain::entities::{ImageKey, PosterImage};
use crate::domain::ports::ImageSourcePort;

use super::memory_cache::{CacheStats, DEFAULT_CACHE_SIZE, ImageCache};

type PendingLoad = Shared<BoxFuture<'static, Option<PosterImage>>>;
type PendingTable = Mutex<HashMap<ImageKey, WeakShared<BoxFuture<'static, Option<PosterImage>>>>>;

/// Configuration for the image loader.
#[derive(Debug, Clone)]
pub struct ImageLoaderConfig {
    /// Maximum posters in memory; 0 for unbounded.
    pub cache_capacity: usize,
    /// Share one fetch between concurrent loads of the same URL.
    pub coalesce_requests: bool,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_SIZE,
            coalesce_requests: true,
        }
    }
}

/// Resolves poster URLs to decoded images.
///
/// Every failure (bad URL, transport, undecodable bytes) yields `None`.
/// Cheap to clone; clones share the cache and the in-flight table.
#[derive(Clone)]
pub struct ImageLoader {
    cache: Arc<Mutex<ImageCache>>,
    source: Arc<dyn ImageSourcePort>,
    /// Loads in flight. Entries are weak so that a load nobody awaits any more is dropped.
    pending: Arc<PendingTable>,
    config: ImageLoaderConfig,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ImageLoader {
    /// Creates a loader with a fresh cache sized from `config`.
    #[must_use]
    pub fn new(source: Arc<dyn ImageSourcePort>, config: ImageLoaderConfig) -> Self {
        let cache = ImageCache::new(config.cache_capacity);
        Self::with_cache(source, cache, config)
    }

    /// Creates a loader around an existing cache, keeping its eviction handler.
    #[must_use]
    pub fn with_cache(
        source: Arc<dyn ImageSourcePort>,
        cache: ImageCache,
        config: ImageLoaderConfig,
    ) -> Self {
        Self {
            cache: Arc::new(Mutex::new(cache)),
            source,
            pending: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Loads the poster at `url`.
    pub async fn load_image(&self, url: &str) -> Option<PosterImage> {
        let Some(key) = ImageKey::parse(url) else {
            warn!(url, "Ignoring poster with an invalid URL");
            return None;
        };

        let cached = self.cache.lock().get(&key);
        if cached.is_some() {
            return cached;
        }

        if !self.config.coalesce_requests {
            return Self::fetch_and_store(self.source.clone(), self.cache.clone(), key).await;
        }

        let load = {
            let mut pending = self.pending.lock();
            if let Some(existing) = pending.get(&key).and_then(WeakShared::upgrade) {
                trace!(key = %key, "Joining in-flight poster load");
                existing
            } else {
                // A load may have finished between the miss above and taking this lock.
                let stored = self.cache.lock().peek(&key);
                if stored.is_some() {
                    return stored;
                }
                let load = self.coalesced_load(key.clone());
                if let Some(weak) = load.downgrade() {
                    pending.insert(key.clone(), weak);
                }
                load
            }
        };

        let mut waiter = Waiter {
            load: Some(load),
            key,
            pending: &self.pending,
        };
        waiter.wait().await
    }

    /// Returns a cached poster without fetching.
    #[must_use]
    pub fn cached(&self, url: &str) -> Option<PosterImage> {
        let key = ImageKey::parse(url)?;
        self.cache.lock().peek(&key)
    }

    /// Shrinks the cache to `retain` posters, as a response to memory pressure.
    ///
    /// Returns how many posters were evicted.
    pub fn handle_memory_pressure(&self, retain: usize) -> usize {
        self.cache.lock().trim(retain)
    }

    /// Returns the cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Drops every cached poster.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    fn coalesced_load(&self, key: ImageKey) -> PendingLoad {
        let source = self.source.clone();
        let cache = self.cache.clone();
        let pending = self.pending.clone();
        async move {
            let image = Self::fetch_and_store(source, cache, key.clone()).await;
            pending.lock().remove(&key);
            image
        }
        .boxed()
        .shared()
    }

    async fn fetch_and_store(
        source: Arc<dyn ImageSourcePort>,
        cache: Arc<Mutex<ImageCache>>,
        key: ImageKey,
    ) -> Option<PosterImage> {
        debug!(key = %key, "Fetching poster");
        let bytes = match source.fetch_image(key.as_str()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = %key, error = %e, "Poster fetch failed");
                return None;
            }
        };

        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await;
        let image = match decoded {
            Ok(Ok(image)) => Arc::new(image),
            Ok(Err(e)) => {
                warn!(key = %key, error = %e, "Poster bytes are not a decodable image");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Poster decode task failed");
                return None;
            }
        };

        cache.lock().set(key, image.clone());
        Some(image)
    }
}

/// One caller awaiting a coalesced load.
///
/// When the last waiter goes away before the load finishes, the load is
/// dropped with it and its table entry is removed here.
struct Waiter<'a> {
    load: Option<PendingLoad>,
    key: ImageKey,
    pending: &'a PendingTable,
}

impl Waiter<'_> {
    async fn wait(&mut self) -> Option<PosterImage> {
        match self.load.as_mut() {
            Some(load) => load.await,
            None => None,
        }
    }
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        drop(self.load.take());
        let mut pending = self.pending.lock();
        let abandoned = pending
            .get(&self.key)
            .is_some_and(|weak| weak.upgrade().is_none());
        if abandoned {
            trace!(key = %self.key, "Dropping abandoned poster load");
            pending.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockImageSource;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;
    use std::time::Duration;

    const URL: &str = "https://image.tmdb.org/t/p/w185/poster.png";

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn loader(source: &Arc<MockImageSource>, coalesce_requests: bool) -> ImageLoader {
        ImageLoader::new(
            source.clone(),
            ImageLoaderConfig {
                cache_capacity: 20,
                coalesce_requests,
            },
        )
    }

    #[tokio::test]
    async fn test_miss_fetches_decodes_and_stores() {
        let source = Arc::new(MockImageSource::new().with_body(URL, png(4, 6)));
        let loader = loader(&source, true);

        let image = loader.load_image(URL).await.unwrap();

        assert_eq!((image.width(), image.height()), (4, 6));
        assert!(loader.cached(URL).is_some());
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_cached_url_never_fetches() {
        let source = Arc::new(MockImageSource::new());
        let mut cache = ImageCache::new(20);
        cache.set(
            ImageKey::parse(URL).unwrap(),
            Arc::new(DynamicImage::new_rgb8(2, 2)),
        );
        let loader = ImageLoader::with_cache(source.clone(), cache, ImageLoaderConfig::default());

        assert!(loader.load_image(URL).await.is_some());
        assert!(loader.load_image(URL).await.is_some());
        assert_eq!(source.fetch_count(), 0);
        assert_eq!(loader.cache_stats().hits, 2);
    }

    #[tokio::test]
    async fn test_network_failure_yields_none() {
        let source = Arc::new(MockImageSource::new());
        let loader = loader(&source, true);

        assert!(loader.load_image(URL).await.is_none());
        assert_eq!(source.fetch_count(), 1);
        assert!(loader.cached(URL).is_none());
    }

    #[tokio::test]
    async fn test_malformed_bytes_yield_none() {
        let source = Arc::new(MockImageSource::new().with_body(URL, &b"not an image"[..]));
        let loader = loader(&source, true);

        assert!(loader.load_image(URL).await.is_none());
        assert!(loader.cached(URL).is_none());
    }

    #[tokio::test]
    async fn test_invalid_url_yields_none_without_fetching() {
        let source = Arc::new(MockImageSource::new());
        let loader = loader(&source, true);

        assert!(loader.load_image("w185/poster.png").await.is_none());
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let source = Arc::new(
            MockImageSource::new()
                .with_body(URL, png(4, 4))
                .with_delay(Duration::from_millis(50)),
        );
        let loader = loader(&source, true);

        let (a, b, c) = tokio::join!(
            loader.load_image(URL),
            loader.load_image(URL),
            loader.load_image(URL)
        );

        assert!(a.is_some() && b.is_some() && c.is_some());
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_uncoalesced_misses_fetch_per_call() {
        let source = Arc::new(
            MockImageSource::new()
                .with_body(URL, png(4, 4))
                .with_delay(Duration::from_millis(50)),
        );
        let loader = loader(&source, false);

        let (a, b) = tokio::join!(loader.load_image(URL), loader.load_image(URL));

        assert!(a.is_some() && b.is_some());
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_load_leaves_no_pending_entry() {
        let source = Arc::new(
            MockImageSource::new()
                .with_body(URL, png(4, 4))
                .with_delay(Duration::from_millis(200)),
        );
        let loader = loader(&source, true);

        let abandoned = tokio::time::timeout(Duration::from_millis(10), loader.load_image(URL)).await;

        assert!(abandoned.is_err());
        assert!(loader.pending.lock().is_empty());
        assert!(loader.load_image(URL).await.is_some());
        assert!(loader.pending.lock().is_empty());
    }

    #[tokio::test]
    async fn test_one_waiter_leaving_keeps_shared_load() {
        let source = Arc::new(
            MockImageSource::new()
                .with_body(URL, png(4, 4))
                .with_delay(Duration::from_millis(100)),
        );
        let loader = loader(&source, true);

        let (early, late) = tokio::join!(
            tokio::time::timeout(Duration::from_millis(10), loader.load_image(URL)),
            loader.load_image(URL)
        );

        assert!(early.is_err());
        assert!(late.is_some());
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_pressure_trims_cache() {
        let other = "https://image.tmdb.org/t/p/w185/other.png";
        let source = Arc::new(
            MockImageSource::new()
                .with_body(URL, png(2, 2))
                .with_body(other, png(2, 2)),
        );
        let loader = loader(&source, true);
        loader.load_image(URL).await.unwrap();
        loader.load_image(other).await.unwrap();

        assert_eq!(loader.handle_memory_pressure(1), 1);
        assert!(loader.cached(URL).is_none());
        assert!(loader.cached(other).is_some());
    }
}
