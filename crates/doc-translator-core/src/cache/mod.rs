mod key;
mod memory;

pub use key::CacheKey;
pub use memory::MemoryCache;

use crate::config::SynonymConfig;

/// Suggestions already fetched for a word in a given context
pub type SynonymCache = MemoryCache<Vec<String>>;

impl SynonymCache {
    pub fn from_config(config: &SynonymConfig) -> Self {
        Self::new(config.cache_max_entries, config.cache_ttl_seconds)
    }
}
