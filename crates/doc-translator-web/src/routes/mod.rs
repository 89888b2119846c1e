//! HTTP route handlers for the translator web application.
//!
//! The index page is an Askama template; every other route speaks JSON,
//! except the job stream (SSE) and downloads (file bodies).

mod documents;
mod download;
mod jobs;
mod pages;
mod translate;
mod words;

pub use documents::{upload_document, upload_payload};
pub use download::download_job;
pub use jobs::{cancel_job, job_stream};
pub use pages::index;
pub use translate::translate_text;
pub use words::{replace_word, suggest_synonyms};

use serde::Serialize;

/// Response for routes that start a background job.
#[derive(Debug, Serialize)]
pub struct JobStarted {
    pub job_id: String,
}
