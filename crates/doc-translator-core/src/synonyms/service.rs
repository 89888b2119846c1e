use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::SynonymProvider;
use super::openai::OpenAiSynonymProvider;
use super::parse::{clean_word, limit_context, parse_synonyms};
use crate::cache::{CacheKey, SynonymCache};
use crate::config::{ApiKey, SynonymConfig};
use crate::error::Result;

/// Result of a lookup. An empty or unreadable answer is `NotFound`, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "synonyms", rename_all = "snake_case")]
pub enum SynonymOutcome {
    Found(Vec<String>),
    NotFound,
}

/// Synonym lookups with cleaning, context limiting and caching.
pub struct SynonymService {
    provider: Arc<dyn SynonymProvider>,
    cache: SynonymCache,
    max_synonyms: usize,
    context_chars: usize,
}

impl SynonymService {
    pub fn new(config: &SynonymConfig) -> Result<Self> {
        let provider = OpenAiSynonymProvider::new(config)?;
        Ok(Self::with_provider(Arc::new(provider), config))
    }

    pub fn with_provider(provider: Arc<dyn SynonymProvider>, config: &SynonymConfig) -> Self {
        Self {
            provider,
            cache: SynonymCache::from_config(config),
            max_synonyms: config.max_synonyms,
            context_chars: config.context_chars,
        }
    }

    /// Suggest alternatives for `word` as used in `context`.
    pub async fn suggest(
        &self,
        credential: &ApiKey,
        word: &str,
        context: &str,
    ) -> Result<SynonymOutcome> {
        let Some(word) = clean_word(word) else {
            debug!("Ignoring synonym lookup for {:?}", word);
            return Ok(SynonymOutcome::NotFound);
        };
        let context = limit_context(context, self.context_chars);
        let key = CacheKey::new(&word, &context, self.provider.model());

        if let Some(cached) = self.cache.get(&key).await {
            debug!("Synonym cache hit for {:?}", word);
            return Ok(SynonymOutcome::Found(cached));
        }

        let raw = self.provider.request(credential, &word, &context).await?;
        let synonyms = parse_synonyms(&raw, &word, self.max_synonyms);

        if synonyms.is_empty() {
            info!("No synonyms found for {:?}", word);
            return Ok(SynonymOutcome::NotFound);
        }

        self.cache.insert(&key, synonyms.clone()).await;
        Ok(SynonymOutcome::Found(synonyms))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
