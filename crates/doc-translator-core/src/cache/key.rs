/// Cache key for synonym lookups.
///
/// Keys are opaque MD5 hashes of the cleaned word, its (already limited)
/// context and the model that answered, so:
/// - Same word + context + model = same key
/// - Any change to inputs produces a different key
/// - Keys are fixed-length (32 hex chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    hash: String,
}

impl CacheKey {
    pub fn new(word: &str, context: &str, model: &str) -> Self {
        // Null-byte separators keep ("a", "bc") and ("ab", "c") apart.
        // Words compare case-insensitively, like the self-match filter.
        let combined = format!("{}\0{}\0{}", word.to_lowercase(), context, model);

        Self {
            hash: format!("{:x}", md5::compute(combined.as_bytes())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_fixed_length_hash() {
        let k = CacheKey::new("happy", "I am happy today", "openai/gpt-oss-120b");
        assert_eq!(k.to_string().len(), 32);
        assert!(k.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_cache_key_differs_by_context() {
        assert_ne!(
            CacheKey::new("bank", "river bank", "m"),
            CacheKey::new("bank", "bank account", "m")
        );
    }

    #[test]
    fn test_cache_key_differs_by_model() {
        assert_ne!(CacheKey::new("big", "", "a"), CacheKey::new("big", "", "b"));
    }

    #[test]
    fn test_cache_key_separators_prevent_collisions() {
        assert_ne!(CacheKey::new("a", "bc", "m"), CacheKey::new("ab", "c", "m"));
    }

    #[test]
    fn test_cache_key_case_insensitive_word() {
        assert_eq!(CacheKey::new("Happy", "ctx", "m"), CacheKey::new("happy", "ctx", "m"));
    }
}
