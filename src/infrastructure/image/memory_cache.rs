//! In-memory LRU poster cache.

use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::{debug, trace};

use crate::domain::entities::{ImageKey, PosterImage};

/// Default maximum number of posters kept in memory.
pub const DEFAULT_CACHE_SIZE: usize = 20;

/// Called with each entry dropped to make room, before it is released.
pub type EvictionHandler = Box<dyn FnMut(&ImageKey, PosterImage) + Send>;

/// Bounded map from canonical URL to decoded poster.
///
/// Eviction is least-recently-used: a `get` promotes the entry, `peek` does
/// not. A capacity of 0 means unbounded until [`ImageCache::trim`] is called
/// in response to memory pressure.
///
/// Not synchronised; wrap it in a mutex to share it.
pub struct ImageCache {
    entries: LruCache<ImageKey, PosterImage>,
    capacity: usize,
    on_evict: Option<EvictionHandler>,
    hits: u64,
    misses: u64,
}

impl ImageCache {
    /// Creates a cache holding at most `capacity` posters (0 for unbounded).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let entries = NonZeroUsize::new(capacity).map_or_else(LruCache::unbounded, LruCache::new);
        Self {
            entries,
            capacity,
            on_evict: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Registers the eviction observer, replacing any previous one.
    pub fn set_eviction_handler(&mut self, handler: impl FnMut(&ImageKey, PosterImage) + Send + 'static) {
        self.on_evict = Some(Box::new(handler));
    }

    /// Returns the configured capacity; 0 means unbounded.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached posters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a poster and marks it as recently used.
    pub fn get(&mut self, key: &ImageKey) -> Option<PosterImage> {
        if let Some(image) = self.entries.get(key) {
            self.hits += 1;
            trace!(key = %key, "Poster cache hit");
            Some(image.clone())
        } else {
            self.misses += 1;
            trace!(key = %key, "Poster cache miss");
            None
        }
    }

    /// Looks up a poster without touching recency or statistics.
    #[must_use]
    pub fn peek(&self, key: &ImageKey) -> Option<PosterImage> {
        self.entries.peek(key).cloned()
    }

    /// Returns true if `key` is cached, without touching recency.
    #[must_use]
    pub fn contains(&self, key: &ImageKey) -> bool {
        self.entries.contains(key)
    }

    /// Stores a poster, overwriting any existing entry for the key.
    ///
    /// When full, the least recently used entry is evicted first.
    pub fn set(&mut self, key: ImageKey, image: PosterImage) {
        let full = self.capacity > 0 && self.entries.len() >= self.capacity;
        if full && !self.entries.contains(&key) {
            self.evict_lru();
        }
        debug!(key = %key, "Storing poster in memory cache");
        self.entries.put(key, image);
    }

    /// Removes a poster. Explicit removal does not notify the eviction handler.
    pub fn remove(&mut self, key: &ImageKey) -> Option<PosterImage> {
        let removed = self.entries.pop(key);
        if removed.is_some() {
            debug!(key = %key, "Removed poster from memory cache");
        }
        removed
    }

    /// Evicts least recently used entries until at most `retain` remain.
    ///
    /// Returns the number of evicted entries.
    pub fn trim(&mut self, retain: usize) -> usize {
        let mut evicted = 0;
        while self.entries.len() > retain && self.evict_lru() {
            evicted += 1;
        }
        if evicted > 0 {
            debug!(evicted, retain, "Trimmed memory cache");
        }
        evicted
    }

    /// Drops every entry without notifying the eviction handler.
    pub fn clear(&mut self) {
        self.entries.clear();
        debug!("Cleared memory poster cache");
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        let hit_rate = if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            hit_rate,
            size: self.len(),
        }
    }

    fn evict_lru(&mut self) -> bool {
        let Some((key, image)) = self.entries.pop_lru() else {
            return false;
        };
        debug!(key = %key, "Evicting poster from memory cache");
        if let Some(on_evict) = self.on_evict.as_mut() {
            on_evict(&key, image);
        }
        true
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached posters.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} posters, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn key(n: usize) -> ImageKey {
        ImageKey::parse(&format!("https://image.tmdb.org/t/p/w185/{n}.jpg")).unwrap()
    }

    fn image() -> PosterImage {
        Arc::new(image::DynamicImage::new_rgb8(10, 10))
    }

    #[test]
    fn test_set_and_get() {
        let mut cache = ImageCache::new(10);
        cache.set(key(1), Arc::new(image::DynamicImage::new_rgb8(100, 50)));

        let retrieved = cache.get(&key(1)).unwrap();
        assert_eq!(retrieved.width(), 100);
        assert!(cache.get(&key(2)).is_none());
    }

    #[test]
    fn test_capacity_is_enforced_with_notification() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let mut cache = ImageCache::new(20);
        let sink = evicted.clone();
        cache.set_eviction_handler(move |key, _image| {
            sink.lock().unwrap().push(key.clone());
        });

        for n in 0..25 {
            cache.set(key(n), image());
        }

        assert_eq!(cache.len(), 20);
        let evicted = evicted.lock().unwrap();
        assert_eq!(*evicted, (0..5).map(key).collect::<Vec<_>>());
        for n in 0..5 {
            assert!(!cache.contains(&key(n)));
        }
        for n in 5..25 {
            assert!(cache.contains(&key(n)));
        }
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let evictions = Arc::new(Mutex::new(0));
        let mut cache = ImageCache::new(2);
        let counter = evictions.clone();
        cache.set_eviction_handler(move |_, _| *counter.lock().unwrap() += 1);

        cache.set(key(1), image());
        cache.set(key(2), image());
        cache.set(key(2), Arc::new(image::DynamicImage::new_rgb8(3, 3)));

        assert_eq!(*evictions.lock().unwrap(), 0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek(&key(2)).unwrap().width(), 3);
    }

    #[test]
    fn test_get_promotes_entry() {
        let mut cache = ImageCache::new(2);
        cache.set(key(1), image());
        cache.set(key(2), image());

        let _ = cache.get(&key(1));
        cache.set(key(3), image());

        assert!(cache.contains(&key(1)));
        assert!(!cache.contains(&key(2)));
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut cache = ImageCache::new(2);
        cache.set(key(1), image());
        cache.set(key(2), image());

        let _ = cache.peek(&key(1));
        cache.set(key(3), image());

        assert!(cache.peek(&key(1)).is_none());
    }

    #[test]
    fn test_remove() {
        let mut cache = ImageCache::new(2);
        cache.set(key(1), image());

        assert!(cache.remove(&key(1)).is_some());
        assert!(cache.remove(&key(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unbounded_until_trimmed() {
        let evictions = Arc::new(Mutex::new(0));
        let mut cache = ImageCache::new(0);
        let counter = evictions.clone();
        cache.set_eviction_handler(move |_, _| *counter.lock().unwrap() += 1);

        for n in 0..100 {
            cache.set(key(n), image());
        }
        assert_eq!(cache.len(), 100);
        assert_eq!(*evictions.lock().unwrap(), 0);

        assert_eq!(cache.trim(10), 90);
        assert_eq!(cache.len(), 10);
        assert_eq!(*evictions.lock().unwrap(), 90);
        assert!(cache.contains(&key(99)));
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = ImageCache::new(10);
        cache.set(key(1), image());

        let _ = cache.get(&key(1));
        let _ = cache.get(&key(2));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(
            stats.to_string(),
            "Cache: 1 posters, 50.0% hit rate (1 hits, 1 misses)"
        );
    }
}
