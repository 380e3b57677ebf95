//! Poster handling infrastructure.
//!
//! This module provides:
//! - Memory caching with LRU eviction
//! - Async poster loading with single-flight fetches

/// Cache-first poster loading.
pub mod loader;
/// LRU poster cache.
pub mod memory_cache;

pub use loader::{ImageLoader, ImageLoaderConfig};
pub use memory_cache::{CacheStats, DEFAULT_CACHE_SIZE, EvictionHandler, ImageCache};
