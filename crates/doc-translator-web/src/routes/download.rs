//! Download route - exported translation of a finished job.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::Response,
};
use doc_translator_core::{ExportFormat, export};
use serde::Deserialize;
use std::sync::Arc;

use crate::helpers::{CoreResultExt, OptionExt, ResultExt, RouteResult};
use crate::state::{AppState, JobOutcome};

#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    /// text, html or word (default text)
    #[serde(default)]
    pub format: Option<String>,
}

/// Download the translated document as text, HTML or Word.
pub async fn download_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> RouteResult<Response> {
    let job = state.get_job(&job_id).await.or_not_found("Job not found")?;
    let format = query
        .format
        .as_deref()
        .map_or(Ok(ExportFormat::default()), str::parse::<ExportFormat>)
        .or_bad_request()?;

    let result = match job.outcome().await {
        Some(JobOutcome::Finished(result)) => result,
        Some(JobOutcome::Failed { message, .. }) => {
            return Err((StatusCode::CONFLICT, message));
        }
        None => {
            return Err((
                StatusCode::CONFLICT,
                "Translation not finished yet".to_string(),
            ));
        }
    };

    let file = export::render(&result.content, result.content_type, format, &job.file_name)
        .or_error_response()?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.mime_type)
        .header(header::CONTENT_DISPOSITION, content_disposition(&file.file_name))
        .body(Body::from(file.bytes))
        .or_internal_error()
}

/// Attachment header with an ASCII fallback and the UTF-8 name (RFC 6266).
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("report_translated.doc"),
            "attachment; filename=\"report_translated.doc\"; filename*=UTF-8''report_translated.doc"
        );
        assert_eq!(
            content_disposition("mi informe_translated.txt"),
            "attachment; filename=\"mi_informe_translated.txt\"; filename*=UTF-8''mi%20informe_translated.txt"
        );
    }
}
