//! Synonym lookups and word replacement in translated text.

use axum::Json;
use axum::extract::State;
use doc_translator_core::{
    Error, SynonymOutcome, WordToken, replace_token, tokenize,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::helpers::{CoreResultExt, RouteResult, credential_or};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SynonymRequest {
    pub word: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Suggest synonyms for a clicked word.
pub async fn suggest_synonyms(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SynonymRequest>,
) -> RouteResult<Json<SynonymOutcome>> {
    let credential = credential_or(request.api_key, state.synonym_key())
        .ok_or(Error::MissingCredential)
        .or_error_response()?;

    let outcome = state
        .synonyms
        .suggest(&credential, &request.word, &request.context)
        .await
        .or_error_response()?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct ReplaceWordRequest {
    pub text: String,
    /// Token position as returned by the tokenizer
    pub index: usize,
    pub replacement: String,
}

#[derive(Debug, Serialize)]
pub struct ReplaceWordResponse {
    pub text: String,
    pub tokens: Vec<WordToken>,
}

/// Swap one word of the translation for a chosen synonym.
pub async fn replace_word(
    Json(request): Json<ReplaceWordRequest>,
) -> RouteResult<Json<ReplaceWordResponse>> {
    let text = replace_token(&request.text, request.index, &request.replacement)
        .or_error_response()?;
    Ok(Json(ReplaceWordResponse {
        tokens: tokenize(&text),
        text,
    }))
}
