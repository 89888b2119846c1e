//! Sequential, rate-paced dispatch of translation requests.
//!
//! Requests go out one at a time in document order with a fixed pause
//! between consecutive requests. The first failure aborts the whole run; no
//! partial output is ever returned.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::traits::{TranslationProvider, TranslationRequest};
use crate::chunker::TextChunk;
use crate::config::{Lang, LimitsConfig};
use crate::error::{Error, Result};
use crate::pipeline::{PipelineState, Progress, RequestContext};
use crate::util::char_len;

/// Batching and pacing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum strings per request
    pub batch_size: usize,
    /// Maximum total characters per request (a single longer string still goes alone)
    pub max_request_chars: usize,
    /// Pause between consecutive requests
    pub request_delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from(&LimitsConfig::default())
    }
}

impl From<&LimitsConfig> for BatchOptions {
    fn from(limits: &LimitsConfig) -> Self {
        Self {
            batch_size: limits.batch_size,
            max_request_chars: limits.max_request_chars,
            request_delay: limits.request_delay(),
        }
    }
}

/// Translations of a whole run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutput {
    pub translations: Vec<String>,
    /// First language the provider reported as detected
    pub detected_source_language: Option<Lang>,
}

pub struct BatchTranslator {
    provider: Arc<dyn TranslationProvider>,
    options: BatchOptions,
}

impl BatchTranslator {
    pub fn new(provider: Arc<dyn TranslationProvider>, options: BatchOptions) -> Self {
        Self { provider, options }
    }

    pub const fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Cut `texts` into consecutive request spans.
    ///
    /// A span closes when it holds `batch_size` strings or when the next
    /// string would push it over `max_request_chars`.
    pub fn partition(&self, texts: &[String]) -> Vec<Range<usize>> {
        let max_entries = self.options.batch_size.max(1);
        let mut spans = Vec::new();
        let mut start = 0;
        let mut chars = 0;

        for (i, text) in texts.iter().enumerate() {
            let len = char_len(text);
            let count = i - start;
            if count > 0 && (count >= max_entries || chars + len > self.options.max_request_chars) {
                spans.push(start..i);
                start = i;
                chars = 0;
            }
            if len > self.options.max_request_chars {
                warn!(
                    "Entry {} has {} characters, above the per-request limit of {}",
                    i, len, self.options.max_request_chars
                );
            }
            chars += len;
        }

        if start < texts.len() {
            spans.push(start..texts.len());
        }
        spans
    }

    /// Translate many short strings (extracted text nodes) in batches.
    pub async fn translate_batch(
        &self,
        ctx: &RequestContext,
        texts: &[String],
        source: &Lang,
        target: &Lang,
    ) -> Result<BatchOutput> {
        let spans = self.partition(texts);
        let total = texts.len();
        info!(
            "Translating {} element(s) in {} request(s)",
            total,
            spans.len()
        );

        self.run(ctx, texts, &spans, source, target, |_, span| {
            format!(
                "Translating elements {}-{} of {}...",
                span.start + 1,
                span.end,
                total
            )
        })
        .await
    }

    /// Translate plain-text chunks, one request per chunk.
    pub async fn translate_chunks(
        &self,
        ctx: &RequestContext,
        chunks: &[TextChunk],
        source: &Lang,
        target: &Lang,
    ) -> Result<BatchOutput> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let spans: Vec<Range<usize>> = (0..texts.len()).map(|i| i..i + 1).collect();
        let parts = spans.len();
        info!("Translating {} chunk(s)", parts);

        self.run(ctx, &texts, &spans, source, target, |i, _| {
            format!("Translating part {} of {}...", i + 1, parts)
        })
        .await
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        texts: &[String],
        spans: &[Range<usize>],
        source: &Lang,
        target: &Lang,
        describe: impl Fn(usize, &Range<usize>) -> String,
    ) -> Result<BatchOutput> {
        let credential = ctx.require_credential()?;
        let mut output = BatchOutput {
            translations: Vec::with_capacity(texts.len()),
            detected_source_language: None,
        };

        for (i, span) in spans.iter().enumerate() {
            ctx.cancel.check()?;
            ctx.report(&Progress {
                state: PipelineState::Translating,
                completed: i,
                total: spans.len(),
                message: describe(i, span),
            });

            let request = TranslationRequest::new(texts[span.clone()].to_vec(), source, target);
            debug!(
                "Request {}/{}: {} string(s) via {}",
                i + 1,
                spans.len(),
                request.texts.len(),
                self.provider.name()
            );

            let result = self
                .provider
                .translate(credential, &request)
                .await
                .inspect_err(|e| error!("Request {}/{} failed: {}", i + 1, spans.len(), e))?;

            if result.translations.len() != request.texts.len() {
                return Err(Error::LengthMismatch {
                    expected: request.texts.len(),
                    actual: result.translations.len(),
                });
            }
            if output.detected_source_language.is_none() {
                output.detected_source_language = result.detected_source_language;
            }
            output.translations.extend(result.translations);

            if i + 1 < spans.len() {
                tokio::time::sleep(self.options.request_delay).await;
            }
        }

        // A cancel that lands during the final request still discards its result.
        ctx.cancel.check()?;
        ctx.report(&Progress {
            state: PipelineState::Translating,
            completed: spans.len(),
            total: spans.len(),
            message: format!("Translated {} request(s)", spans.len()),
        });

        Ok(output)
    }
}
