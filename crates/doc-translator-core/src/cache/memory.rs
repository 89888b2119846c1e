use moka::future::Cache;
use std::time::Duration;

use super::key::CacheKey;

/// In-memory cache using moka with entry-count eviction.
pub struct MemoryCache<V: Clone + Send + Sync + 'static> {
    cache: Cache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> MemoryCache<V> {
    /// `ttl_seconds` of 0 keeps entries until evicted by capacity.
    pub fn new(max_entries: u64, ttl_seconds: u64) -> Self {
        let mut builder = Cache::builder().max_capacity(max_entries);

        if ttl_seconds > 0 {
            builder = builder.time_to_live(Duration::from_secs(ttl_seconds));
        }

        Self {
            cache: builder.build(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        self.cache.get(key.as_str()).await
    }

    pub async fn insert(&self, key: &CacheKey, value: V) {
        self.cache.insert(key.to_string(), value).await;
    }

    pub async fn remove(&self, key: &CacheKey) {
        self.cache.remove(key.as_str()).await;
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}
