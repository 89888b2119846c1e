use async_trait::async_trait;

use crate::config::{ApiKey, Lang};
use crate::error::Result;

/// Information about a translation backend
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    /// Human-readable name
    pub name: &'static str,
    /// Whether this provider can detect the source language itself
    pub supports_auto_detect: bool,
}

/// One provider call: 1..N strings translated together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub texts: Vec<String>,
    pub target: Lang,
    /// `None` asks the provider to detect the source language
    pub source: Option<Lang>,
}

impl TranslationRequest {
    pub fn new(texts: Vec<String>, source: &Lang, target: &Lang) -> Self {
        Self {
            texts,
            target: target.clone(),
            source: (!source.is_auto()).then(|| source.clone()),
        }
    }
}

/// Provider answer, parallel to the request's `texts`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationResult {
    pub translations: Vec<String>,
    /// Reported when the source language was auto-detected
    pub detected_source_language: Option<Lang>,
}

/// Trait for translation backends
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Get information about this provider
    fn info(&self) -> ProviderInfo;

    /// Get the provider name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Translate every string of `request`, authenticating with `credential`.
    async fn translate(
        &self,
        credential: &ApiKey,
        request: &TranslationRequest,
    ) -> Result<TranslationResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_source_is_omitted() {
        let request = TranslationRequest::new(vec!["hi".into()], &Lang::auto(), &Lang::new("es"));
        assert!(request.source.is_none());

        let request = TranslationRequest::new(vec!["hi".into()], &Lang::new("en"), &Lang::new("es"));
        assert_eq!(request.source, Some(Lang::new("en")));
    }
}
