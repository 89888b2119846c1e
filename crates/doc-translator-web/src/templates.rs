//! Askama templates for the browser UI.
//!
//! The page is rendered once; everything after that goes through the JSON
//! and SSE endpoints from `static/app.js`.

use askama::Template;
use askama_web::WebTemplate;
use doc_translator_core::{AppConfig, LanguageOption, source_languages, target_languages};

/// Landing page with the text and document tabs.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub source_languages: Vec<LanguageOption>,
    pub target_languages: Vec<LanguageOption>,
    pub default_source: String,
    pub default_target: String,
    pub max_text_chars: usize,
    pub max_file_mb: usize,
    /// Whether the server holds its own key, so the key field may stay empty
    pub has_server_key: bool,
    pub has_synonym_key: bool,
}

impl IndexTemplate {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            source_languages: source_languages(),
            target_languages: target_languages(),
            default_source: config.languages.source.as_str().to_string(),
            default_target: config.languages.target.as_str().to_string(),
            max_text_chars: config.limits.max_text_chars,
            max_file_mb: config.limits.max_file_bytes / (1024 * 1024),
            has_server_key: config.provider.default_credential().is_some(),
            has_synonym_key: config.synonyms.default_credential().is_some(),
        }
    }

    pub fn is_default_source(&self, code: &str) -> bool {
        self.default_source == code
    }

    pub fn is_default_target(&self, code: &str) -> bool {
        self.default_target == code
    }
}
