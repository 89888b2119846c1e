//! Job routes - progress stream and cancellation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use doc_translator_core::{ContentType, Lang, PipelineState, Progress};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::helpers::{OptionExt, RouteResult};
use crate::state::{AppState, Job, JobOutcome};

/// Payload of the final `done` event.
#[derive(Debug, Serialize)]
struct DoneEvent<'a> {
    content: &'a str,
    content_type: ContentType,
    detected_source_language: Option<&'a Lang>,
    segments: usize,
    status_message: String,
}

/// Payload of the final `error` event.
#[derive(Debug, Serialize)]
struct ErrorEvent<'a> {
    stage: PipelineState,
    message: &'a str,
}

fn json_event(name: &str, data: &impl Serialize) -> Option<Event> {
    serde_json::to_string(data)
        .ok()
        .map(|json| Event::default().event(name).data(json))
}

fn outcome_event(outcome: &JobOutcome) -> Option<Event> {
    match outcome {
        JobOutcome::Finished(result) => json_event(
            "done",
            &DoneEvent {
                content: &result.content,
                content_type: result.content_type,
                detected_source_language: result.detected_source_language.as_ref(),
                segments: result.segments,
                status_message: result.status_message(),
            },
        ),
        JobOutcome::Failed { stage, message } => json_event(
            "error",
            &ErrorEvent {
                stage: *stage,
                message,
            },
        ),
    }
}

/// Progress not yet sent on this stream, if the job reported since.
fn fresh_progress(job: &Job, last_version: &mut Option<usize>) -> Option<Progress> {
    let version = job.version();
    if *last_version == Some(version) {
        return None;
    }
    *last_version = Some(version);
    Some(job.progress())
}

/// SSE stream of job progress.
///
/// Sends a `progress` event whenever the pipeline reports, then exactly one
/// `done` or `error` event.
#[allow(tail_expr_drop_order)] // Drop order change in async_stream macro is harmless here
pub async fn job_stream(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> RouteResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let job = state.get_job(&job_id).await.or_not_found("Job not found")?;

    let stream = async_stream::stream! {
        let mut last_version = None;

        loop {
            // Outcome is read before progress: every report precedes `finish`,
            // so the last snapshot always goes out ahead of the final event
            let outcome_future = job.outcome();
            let outcome = outcome_future.await;

            if let Some(progress) = fresh_progress(&job, &mut last_version) {
                if let Some(event) = json_event("progress", &progress) {
                    yield Ok(event);
                }
            }

            if let Some(outcome) = outcome {
                if let Some(event) = outcome_event(&outcome) {
                    yield Ok(event);
                }
                break;
            }

            // Check for updates every 100ms (but only send when changed)
            let sleep_future = tokio::time::sleep(Duration::from_millis(100));
            sleep_future.await;
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Request cancellation; the job stops before its next provider request.
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> RouteResult<StatusCode> {
    let job = state.get_job(&job_id).await.or_not_found("Job not found")?;
    if job.outcome().await.is_some() {
        return Err((StatusCode::CONFLICT, "Job already finished".to_string()));
    }

    job.cancel.cancel();
    info!("Cancellation requested for job {}", job_id);
    Ok(StatusCode::ACCEPTED)
}
