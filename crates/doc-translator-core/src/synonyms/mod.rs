//! Synonym suggestions for words of a finished translation, and the
//! word-level editing that applies a chosen suggestion.

mod openai;
mod parse;
mod service;
mod words;

pub use openai::OpenAiSynonymProvider;
pub use parse::{clean_word, limit_context, parse_synonyms};
pub use service::{SynonymOutcome, SynonymService};
pub use words::{WordToken, replace_token, tokenize};

use async_trait::async_trait;

use crate::config::ApiKey;
use crate::error::Result;

/// Trait for synonym backends
#[async_trait]
pub trait SynonymProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Model identifier, part of the cache key
    fn model(&self) -> &str;

    /// Ask for synonyms of `word`, returning the backend's raw answer.
    async fn request(&self, credential: &ApiKey, word: &str, context: &str) -> Result<String>;
}
