use thiserror::Error;

/// Unified error type for doc-translator-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Input validation (credential, empty or oversized input, file types)
/// - Document reading (file extraction, HTML content discovery)
/// - Translation operations (provider requests, responses, cancellation)
/// - Synonym lookups
/// - Configuration operations (loading, validation)
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Input Errors
    // ==========================================================================
    /// No API credential was supplied for the translation provider
    #[error("Please configure your API key first")]
    MissingCredential,

    /// Nothing to translate
    #[error("Please enter text or select a file to translate")]
    EmptyInput,

    /// Source text or file exceeds the accepted ceiling
    #[error("input is too large: {actual} {unit} (maximum {limit} {unit})")]
    InputTooLarge {
        actual: usize,
        limit: usize,
        unit: &'static str,
    },

    /// File extension is not one of the accepted types
    #[error("unsupported file type '{0}': only TXT, PDF, and DOCX files are supported")]
    UnsupportedFileType(String),

    /// Converting a file into text or HTML failed
    #[error("error reading file: {0}")]
    Extraction(String),

    /// The HTML document has no text to translate
    #[error("No text content found in document")]
    NoContentFound,

    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// Provider answered with a non-success status
    #[error("{message}")]
    ProviderRequest { status: Option<u16>, message: String },

    /// Provider answered with a body we could not understand
    #[error("invalid translation API response: {0}")]
    ProviderInvalidResponse(String),

    /// Translation request timed out
    #[error("translation request timed out")]
    ProviderTimeout,

    /// Every request succeeded but the assembled text is blank
    #[error("Translation resulted in empty content")]
    EmptyTranslationResult,

    /// The caller abandoned the translation
    #[error("translation cancelled")]
    Cancelled,

    // ==========================================================================
    // Contract Violations
    // ==========================================================================
    /// Two sequences that must be parallel have different lengths
    #[error("length mismatch: expected {expected} entries, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A node handle does not point at a text node of the document
    #[error("node {0} is not a text node of this document")]
    InvalidNodeRef(usize),

    // ==========================================================================
    // Synonym Errors
    // ==========================================================================
    /// Synonym backend request failed
    #[error("Unable to fetch synonyms: {0}")]
    SynonymRequest(String),

    /// Word replacement targeted a position that holds no selectable word
    #[error("no selectable word at token {0}")]
    InvalidWordIndex(usize),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Internal invariant violations. These halt processing and are reported
    /// as internal failures rather than as problems with the user's input.
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::LengthMismatch { .. } | Self::InvalidNodeRef(_))
    }

    /// Whether the failure is worth retrying against the provider.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::ProviderTimeout => true,
            Self::ProviderRequest { status, .. } => match status {
                Some(code) => *code == 429 || *code >= 500,
                // Transport-level failure (connection refused, reset)
                None => true,
            },
            _ => false,
        }
    }

    pub(crate) fn provider_failure(status: Option<u16>, message: Option<String>) -> Self {
        Self::ProviderRequest {
            status,
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Translation failed".to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
