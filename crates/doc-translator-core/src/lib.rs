//! Doc Translator Core Library
//!
//! This library provides the core functionality for translating text and documents:
//! - Chunking long plain text at paragraph and sentence boundaries
//! - Extracting text nodes from HTML and writing translations back in place
//! - Sequential, rate-paced batch translation via a Google v2 compatible API
//! - Synonym suggestions via OpenAI-compatible chat APIs
//! - Reading TXT, PDF and HTML sources
//! - Exporting results as text, standalone HTML or Word-compatible files

pub mod cache;
pub mod chunker;
pub mod config;
pub mod error;
pub mod export;
pub mod html;
pub mod input;
pub mod pipeline;
pub mod synonyms;
pub mod translator;
pub mod util;

pub use chunker::{CHUNK_SEPARATOR, TextChunk, join_chunks, split_into_chunks};
pub use config::{
    ApiKey, AppConfig, DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG, Lang, LanguageOption,
    LimitsConfig, ProviderConfig, SynonymConfig, source_languages, target_languages,
};
pub use error::{Error, Result};
pub use export::{ExportFile, ExportFormat, output_file_name};
pub use html::{ExtractedNode, HtmlDocument, NodeId, extract_text_nodes, reassemble};
pub use input::{
    ContentType, FileKind, InputOrigin, SourcePayload, read_source_bytes, read_source_file,
    validate_file,
};
pub use pipeline::{
    CancellationFlag, PipelineError, PipelineState, Progress, ProgressCallback, RequestContext,
};
pub use synonyms::{SynonymOutcome, SynonymService, WordToken, replace_token, tokenize};
pub use translator::{
    BatchOptions, BatchOutput, BatchTranslator, GoogleTranslator, TranslationProvider,
    create_provider,
};

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::util::char_len;

/// High-level translator that runs one request through the whole pipeline
pub struct DocumentTranslator {
    batcher: BatchTranslator,
    config: AppConfig,
}

/// One translation request: what to translate and between which languages.
#[derive(Debug, Clone)]
pub struct TranslateInput {
    pub payload: SourcePayload,
    pub origin: InputOrigin,
    pub source: Lang,
    pub target: Lang,
}

impl TranslateInput {
    /// Text typed or pasted by the user
    pub fn direct_text(text: impl Into<String>, source: Lang, target: Lang) -> Self {
        Self {
            payload: SourcePayload::text(text),
            origin: InputOrigin::Direct,
            source,
            target,
        }
    }

    /// Content read from an uploaded or local file
    pub const fn file(payload: SourcePayload, source: Lang, target: Lang) -> Self {
        Self {
            payload,
            origin: InputOrigin::File,
            source,
            target,
        }
    }
}

/// Result of a finished translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedContent {
    pub content: String,
    pub content_type: ContentType,
    pub origin: InputOrigin,
    /// Reported by the provider when the source language was auto-detected
    pub detected_source_language: Option<Lang>,
    /// Chunks or text nodes that were translated
    pub segments: usize,
}

impl TranslatedContent {
    /// User-facing success message.
    pub fn status_message(&self) -> String {
        match self.origin {
            InputOrigin::Direct => {
                let mut msg = "Translation completed successfully! Click on any word for synonyms."
                    .to_string();
                if let Some(lang) = &self.detected_source_language {
                    msg.push_str(&format!(" (Detected: {lang})"));
                }
                msg
            }
            InputOrigin::File => {
                "Document translated successfully with formatting preserved!".to_string()
            }
        }
    }
}

impl DocumentTranslator {
    /// Create a translator talking to the configured provider
    pub fn new(config: AppConfig) -> Result<Self> {
        let provider = create_provider(&config.provider)?;
        Ok(Self::with_provider(provider, config))
    }

    /// Create with a custom provider
    pub fn with_provider(provider: Arc<dyn TranslationProvider>, config: AppConfig) -> Self {
        let batcher = BatchTranslator::new(provider, BatchOptions::from(&config.limits));
        Self { batcher, config }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run `input` through the pipeline.
    ///
    /// Progress and the terminal state are reported through `ctx`; on failure
    /// the error carries the stage it came from.
    pub async fn translate(
        &self,
        ctx: &RequestContext,
        input: TranslateInput,
    ) -> std::result::Result<TranslatedContent, PipelineError> {
        let mut stage = PipelineState::Idle;

        match self.run(ctx, input, &mut stage).await {
            Ok(content) => {
                info!(
                    "Translated {} {} segment(s) into {} characters",
                    content.segments,
                    content.content_type.as_str(),
                    char_len(&content.content)
                );
                ctx.report(&Progress::stage(PipelineState::Done, content.status_message()));
                Ok(content)
            }
            Err(source) => {
                let err = PipelineError::new(stage, source);
                error!("Translation failed while {}: {}", stage, err.source);
                ctx.report(&Progress::stage(PipelineState::Failed, err.status_message()));
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        input: TranslateInput,
        stage: &mut PipelineState,
    ) -> Result<TranslatedContent> {
        let TranslateInput {
            payload,
            origin,
            source,
            target,
        } = input;
        let limits = &self.config.limits;

        let reading = match origin {
            InputOrigin::Direct => "Translating...",
            InputOrigin::File => "Reading document...",
        };
        enter(ctx, stage, PipelineState::Reading, reading);
        ctx.require_credential()?;
        if payload.is_blank() {
            return Err(Error::EmptyInput);
        }

        match payload {
            SourcePayload::Text { content } => {
                // Direct entry is bounded by its own ceiling and goes out as one request.
                let (text, budget) = match origin {
                    InputOrigin::Direct => {
                        let text = content.trim();
                        let len = char_len(text);
                        if len > limits.max_text_chars {
                            return Err(Error::InputTooLarge {
                                actual: len,
                                limit: limits.max_text_chars,
                                unit: "characters",
                            });
                        }
                        (text.to_string(), limits.max_text_chars)
                    }
                    InputOrigin::File => (content, limits.max_chunk_chars),
                };

                enter(ctx, stage, PipelineState::ChunkingText, "Splitting text...");
                let chunks = split_into_chunks(&text, budget);

                enter(
                    ctx,
                    stage,
                    PipelineState::Translating,
                    format!("Translating document in {} part(s)... Please wait.", chunks.len()),
                );
                let output = self
                    .batcher
                    .translate_chunks(ctx, &chunks, &source, &target)
                    .await?;

                enter(ctx, stage, PipelineState::Reassembling, "Joining translated parts...");
                let content = join_chunks(&output.translations);
                if content.trim().is_empty() {
                    return Err(Error::EmptyTranslationResult);
                }

                Ok(TranslatedContent {
                    content,
                    content_type: ContentType::Text,
                    origin,
                    detected_source_language: output.detected_source_language,
                    segments: chunks.len(),
                })
            }
            SourcePayload::Html { html } => {
                enter(ctx, stage, PipelineState::ExtractingHtml, "Extracting text from document...");
                let mut doc = HtmlDocument::parse(&html);
                let nodes = extract_text_nodes(&doc)?;
                let texts: Vec<String> = nodes.iter().map(|n| n.text().to_string()).collect();

                enter(ctx, stage, PipelineState::Translating, "Translating formatted document...");
                let output = self
                    .batcher
                    .translate_batch(ctx, &texts, &source, &target)
                    .await?;

                enter(ctx, stage, PipelineState::Reassembling, "Rebuilding document...");
                let segments = nodes.len();
                let content = reassemble(&mut doc, nodes, output.translations)?;

                Ok(TranslatedContent {
                    content,
                    content_type: ContentType::Html,
                    origin,
                    detected_source_language: output.detected_source_language,
                    segments,
                })
            }
        }
    }
}

fn enter(
    ctx: &RequestContext,
    stage: &mut PipelineState,
    next: PipelineState,
    message: impl Into<String>,
) {
    *stage = next;
    ctx.report(&Progress::stage(next, message));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(origin: InputOrigin, detected: Option<&str>) -> TranslatedContent {
        TranslatedContent {
            content: "Hola mundo".to_string(),
            content_type: ContentType::Text,
            origin,
            detected_source_language: detected.map(Lang::new),
            segments: 1,
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.languages.source.is_auto());
        assert_eq!(config.languages.target.as_str(), "en");
    }

    #[test]
    fn test_status_message_mentions_detected_language() {
        assert_eq!(
            content(InputOrigin::Direct, Some("en")).status_message(),
            "Translation completed successfully! Click on any word for synonyms. (Detected: en)"
        );
        assert_eq!(
            content(InputOrigin::Direct, None).status_message(),
            "Translation completed successfully! Click on any word for synonyms."
        );
        assert_eq!(
            content(InputOrigin::File, Some("en")).status_message(),
            "Document translated successfully with formatting preserved!"
        );
    }
}
