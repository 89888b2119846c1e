//! Document routes - start a background translation from an upload or from
//! a payload the browser already extracted (DOCX converted to HTML).

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::Multipart;
use doc_translator_core::{
    ApiKey, Error, Progress, RequestContext, SourcePayload, TranslateInput, read_source_bytes,
    validate_file,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use super::JobStarted;
use crate::helpers::{CoreResultExt, ResultExt, RouteResult, credential_or, lang_or};
use crate::state::{AppState, JobOutcome};

/// Upload a TXT, PDF or HTML file - returns 202 with the job id.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> RouteResult<(StatusCode, Json<JobStarted>)> {
    let mut file = None;
    let mut source = None;
    let mut target = None;
    let mut api_key = None;

    while let Some(field) = multipart.next_field().await.or_bad_request()? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("document.txt").to_string();
                let data = field.bytes().await.or_bad_request()?;
                file = Some((filename, data));
            }
            "source" => source = Some(field.text().await.or_bad_request()?),
            "target" => target = Some(field.text().await.or_bad_request()?),
            "api_key" => api_key = Some(field.text().await.or_bad_request()?),
            _ => {}
        }
    }

    let credential = require_credential(&state, api_key)?;
    let (filename, data) = file.ok_or((StatusCode::BAD_REQUEST, "No file uploaded".to_string()))?;
    validate_file(&filename, data.len(), state.config.limits.max_file_bytes)
        .or_error_response()?;

    // PDF text extraction is CPU-bound, keep it off the async runtime
    let name = filename.clone();
    let payload = tokio::task::spawn_blocking(move || read_source_bytes(&name, &data))
        .await
        .map_err(|e| {
            error!("File reading task panicked: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "File reading failed".to_string(),
            )
        })?
        .or_error_response()?;

    let languages = &state.config.languages;
    let input = TranslateInput::file(
        payload,
        lang_or(source, &languages.source),
        lang_or(target, &languages.target),
    );
    let started = start_job(&state, input, filename, credential).await;
    Ok((StatusCode::ACCEPTED, Json(started)))
}

#[derive(Debug, Deserialize)]
pub struct PayloadRequest {
    pub payload: SourcePayload,
    pub file_name: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Start a job from content extracted in the browser.
pub async fn upload_payload(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PayloadRequest>,
) -> RouteResult<(StatusCode, Json<JobStarted>)> {
    let credential = require_credential(&state, request.api_key)?;
    // Same type and size rules as an upload, measured on the extracted content
    validate_file(
        &request.file_name,
        request.payload.as_str().len(),
        state.config.limits.max_file_bytes,
    )
    .or_error_response()?;

    let languages = &state.config.languages;
    let input = TranslateInput::file(
        request.payload,
        lang_or(request.source, &languages.source),
        lang_or(request.target, &languages.target),
    );
    let started = start_job(&state, input, request.file_name, credential).await;
    Ok((StatusCode::ACCEPTED, Json(started)))
}

/// The credential is checked before any file is read.
fn require_credential(state: &AppState, api_key: Option<String>) -> RouteResult<ApiKey> {
    credential_or(api_key, state.translation_key())
        .ok_or(Error::MissingCredential)
        .or_error_response()
}

/// Spawn the pipeline for `input` and return the new job's id.
async fn start_job(
    state: &Arc<AppState>,
    input: TranslateInput,
    file_name: String,
    credential: ApiKey,
) -> JobStarted {
    let (id, job) = state.create_job(file_name).await;
    info!(
        "Started job {} for {} ({} -> {})",
        id,
        job.file_name,
        input.source,
        input.target
    );

    let state = Arc::clone(state);
    tokio::spawn(async move {
        let reporter = Arc::clone(&job);
        let ctx = RequestContext::new(Some(credential))
            .with_cancel(job.cancel.clone())
            .with_progress(Arc::new(move |p: &Progress| reporter.report(p)));

        let outcome = match state.translator.translate(&ctx, input).await {
            Ok(content) => JobOutcome::Finished(content),
            Err(e) => JobOutcome::Failed {
                stage: e.stage,
                message: e.status_message(),
            },
        };
        job.finish(outcome).await;
    });

    JobStarted {
        job_id: id.to_string(),
    }
}

