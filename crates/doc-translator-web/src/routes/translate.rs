//! Direct text translation - one request, answered when done.

use axum::Json;
use axum::extract::State;
use doc_translator_core::{
    Lang, RequestContext, TranslateInput, WordToken, tokenize,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::helpers::{CoreResultExt, RouteResult, credential_or, lang_or};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TranslateTextRequest {
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateTextResponse {
    pub translation: String,
    pub detected_source_language: Option<Lang>,
    /// Words and separators of `translation`, for click-to-edit
    pub tokens: Vec<WordToken>,
    pub status_message: String,
}

/// Translate typed or pasted text.
pub async fn translate_text(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateTextRequest>,
) -> RouteResult<Json<TranslateTextResponse>> {
    let languages = &state.config.languages;
    let input = TranslateInput::direct_text(
        request.text,
        lang_or(request.source, &languages.source),
        lang_or(request.target, &languages.target),
    );
    let ctx = RequestContext::new(credential_or(request.api_key, state.translation_key()));

    let result = state.translator.translate(&ctx, input).await.or_error_response()?;
    info!(
        "Translated {} characters of direct text",
        result.content.chars().count()
    );

    Ok(Json(TranslateTextResponse {
        tokens: tokenize(&result.content),
        status_message: result.status_message(),
        detected_source_language: result.detected_source_language,
        translation: result.content,
    }))
}
