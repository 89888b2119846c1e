use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Language codes following ISO 639-1 with regional variants.
///
/// The special code `auto` asks the provider to detect the source language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub const AUTO: &'static str = "auto";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn auto() -> Self {
        Self::new(Self::AUTO)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank codes count as auto-detect too.
    pub fn is_auto(&self) -> bool {
        let code = self.0.trim();
        code.is_empty() || code.eq_ignore_ascii_case(Self::AUTO)
    }
}

// Serde default functions for common languages
fn default_source_lang() -> Lang {
    Lang::auto()
}

fn default_target_lang() -> Lang {
    Lang::new("en")
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Caller-supplied credential for a remote API.
///
/// `Debug` output is redacted so keys never reach the logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank keys.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        (!key.is_empty()).then_some(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Translation provider configuration (Google Cloud Translation v2 compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_api_base")]
    pub api_base: String,
    /// Server-side default key; requests may carry their own.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts for transient failures (0 = fail on first error)
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

pub const DEFAULT_PROVIDER_API_BASE: &str =
    "https://translation.googleapis.com/language/translate/v2";

fn default_provider_api_base() -> String {
    DEFAULT_PROVIDER_API_BASE.to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_retry_delay_ms() -> u64 {
    1000
}

impl ProviderConfig {
    pub fn new(api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            ..Default::default()
        }
    }

    pub fn default_credential(&self) -> Option<ApiKey> {
        self.api_key.clone().and_then(ApiKey::new)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_provider_api_base(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            retry_count: 0,
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Size and pacing limits of the translation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Ceiling for directly entered text (characters)
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Chunk budget for file-derived plain text (characters)
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Maximum extracted text nodes per provider request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum total characters per provider request
    #[serde(default = "default_max_request_chars")]
    pub max_request_chars: usize,

    /// Pause between consecutive provider requests
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Maximum accepted source file size (bytes)
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

const fn default_max_text_chars() -> usize {
    25_000
}

const fn default_max_chunk_chars() -> usize {
    20_000
}

const fn default_batch_size() -> usize {
    100
}

const fn default_max_request_chars() -> usize {
    30_000
}

const fn default_request_delay_ms() -> u64 {
    500
}

const fn default_max_file_bytes() -> usize {
    10 * 1024 * 1024
}

impl LimitsConfig {
    pub const fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn validate(&self) -> Result<(), crate::error::Error> {
        let positive = [
            ("max_text_chars", self.max_text_chars),
            ("max_chunk_chars", self.max_chunk_chars),
            ("batch_size", self.batch_size),
            ("max_request_chars", self.max_request_chars),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(crate::error::Error::ConfigInvalid {
                    field: field.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
            max_chunk_chars: default_max_chunk_chars(),
            batch_size: default_batch_size(),
            max_request_chars: default_max_request_chars(),
            request_delay_ms: default_request_delay_ms(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

/// Synonym backend configuration for OpenAI-compatible chat APIs.
///
/// Defaults target Groq; any OpenAI-compatible server works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymConfig {
    #[serde(default = "default_synonym_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_synonym_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_synonyms")]
    pub max_synonyms: usize,
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: u64,
    /// Cache TTL in seconds (0 = no expiry)
    #[serde(default)]
    pub cache_ttl_seconds: u64,
}

fn default_synonym_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_synonym_model() -> String {
    "openai/gpt-oss-120b".to_string()
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_max_tokens() -> u32 {
    150
}

const fn default_max_synonyms() -> usize {
    7
}

const fn default_context_chars() -> usize {
    500
}

const fn default_cache_max_entries() -> u64 {
    1000
}

impl SynonymConfig {
    pub fn default_credential(&self) -> Option<ApiKey> {
        self.api_key.clone().and_then(ApiKey::new)
    }
}

impl Default for SynonymConfig {
    fn default() -> Self {
        Self {
            api_base: default_synonym_api_base(),
            api_key: None,
            model: default_synonym_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_synonyms: default_max_synonyms(),
            context_chars: default_context_chars(),
            cache_max_entries: default_cache_max_entries(),
            cache_ttl_seconds: 0,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Translation provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Pipeline limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Synonym backend configuration
    #[serde(default)]
    pub synonyms: SynonymConfig,

    /// Default source/target languages for the surfaces
    #[serde(default)]
    pub languages: LanguageDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageDefaults {
    #[serde(default = "default_source_lang")]
    pub source: Lang,
    #[serde(default = "default_target_lang")]
    pub target: Lang,
}

impl Default for LanguageDefaults {
    fn default() -> Self {
        Self {
            source: default_source_lang(),
            target: default_target_lang(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            crate::error::Error::ConfigLoad(format!("Failed to parse config: {e}"))
        })?;
        config.limits.validate()?;
        Ok(config)
    }

    /// Load from default locations (~/.config/doc-translator/config.toml, ./config.toml)
    pub fn load() -> Self {
        let candidates = crate::util::config_dir()
            .map(|dir| dir.join("doc-translator").join("config.toml"))
            .into_iter()
            .chain(std::iter::once(std::path::PathBuf::from("config.toml")));

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", path.display(), e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

/// A language option for UI dropdowns
#[derive(Debug, Clone, Serialize)]
pub struct LanguageOption {
    /// ISO language code (e.g., "en", "te", "zh-CN")
    pub code: &'static str,
    /// Display name (e.g., "English", "Telugu")
    pub name: &'static str,
}

const LANGUAGES: &[LanguageOption] = &[
    LanguageOption { code: "en", name: "English" },
    LanguageOption { code: "te", name: "Telugu" },
    LanguageOption { code: "hi", name: "Hindi" },
    LanguageOption { code: "ta", name: "Tamil" },
    LanguageOption { code: "kn", name: "Kannada" },
    LanguageOption { code: "ml", name: "Malayalam" },
    LanguageOption { code: "bn", name: "Bengali" },
    LanguageOption { code: "mr", name: "Marathi" },
    LanguageOption { code: "es", name: "Spanish" },
    LanguageOption { code: "fr", name: "French" },
    LanguageOption { code: "de", name: "German" },
    LanguageOption { code: "it", name: "Italian" },
    LanguageOption { code: "pt", name: "Portuguese" },
    LanguageOption { code: "ru", name: "Russian" },
    LanguageOption { code: "ar", name: "Arabic" },
    LanguageOption { code: "zh-CN", name: "Chinese (Simplified)" },
    LanguageOption { code: "ja", name: "Japanese" },
    LanguageOption { code: "ko", name: "Korean" },
];

/// Languages available as translation source, auto-detect first.
pub fn source_languages() -> Vec<LanguageOption> {
    std::iter::once(LanguageOption { code: Lang::AUTO, name: "Auto-detect" })
        .chain(LANGUAGES.iter().cloned())
        .collect()
}

/// Languages available as translation target.
pub fn target_languages() -> Vec<LanguageOption> {
    LANGUAGES.to_vec()
}

/// Default source language code
pub const DEFAULT_SOURCE_LANG: &str = Lang::AUTO;
/// Default target language code
pub const DEFAULT_TARGET_LANG: &str = "en";
