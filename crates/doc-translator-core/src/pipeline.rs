//! Per-request translation context: stage tracking, progress reporting and
//! cancellation.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::ApiKey;
use crate::error::Error;

/// Stages of one translation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Reading,
    ChunkingText,
    ExtractingHtml,
    Translating,
    Reassembling,
    Done,
    Failed,
}

impl PipelineState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Reading => "reading",
            Self::ChunkingText => "chunking text",
            Self::ExtractingHtml => "extracting HTML",
            Self::Translating => "translating",
            Self::Reassembling => "reassembling",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A progress report, emitted on each stage change and before every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub state: PipelineState,
    /// Requests finished so far
    pub completed: usize,
    /// Requests planned (0 until known)
    pub total: usize,
    pub message: String,
}

impl Progress {
    pub fn stage(state: PipelineState, message: impl Into<String>) -> Self {
        Self {
            state,
            completed: 0,
            total: 0,
            message: message.into(),
        }
    }
}

pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Cooperative cancellation shared between a request and whoever started it.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation was requested.
    pub fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Everything a single request needs beyond its input.
///
/// Credentials and callbacks travel with the request instead of living in
/// shared state.
#[derive(Clone, Default)]
pub struct RequestContext {
    pub credential: Option<ApiKey>,
    pub cancel: CancellationFlag,
    progress: Option<ProgressCallback>,
}

impl RequestContext {
    pub fn new(credential: Option<ApiKey>) -> Self {
        Self {
            credential,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn report(&self, progress: &Progress) {
        if let Some(callback) = &self.progress {
            callback(progress);
        }
    }

    pub fn require_credential(&self) -> Result<&ApiKey, Error> {
        self.credential.as_ref().ok_or(Error::MissingCredential)
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("credential", &self.credential)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// A failed translation request, tagged with the stage that failed.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct PipelineError {
    pub stage: PipelineState,
    #[source]
    pub source: Error,
}

impl PipelineError {
    pub const fn new(stage: PipelineState, source: Error) -> Self {
        Self { stage, source }
    }

    /// Message for status displays, e.g. "Error: Invalid target language".
    pub fn status_message(&self) -> String {
        if self.source.is_contract_violation() {
            format!("Error: internal failure while {}", self.stage)
        } else {
            format!("Error: {}", self.source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_cancellation_is_shared_between_clones() {
        let flag = CancellationFlag::new();
        let other = flag.clone();
        assert!(flag.check().is_ok());
        other.cancel();
        assert!(matches!(flag.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_progress_reaches_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let ctx = RequestContext::new(None).with_progress(Arc::new(move |p: &Progress| {
            sink.lock().unwrap().push(p.state);
        }));
        ctx.report(&Progress::stage(PipelineState::Reading, "Reading document..."));
        assert_eq!(*seen.lock().unwrap(), vec![PipelineState::Reading]);
    }

    #[test]
    fn test_missing_credential() {
        let ctx = RequestContext::new(None);
        assert!(matches!(ctx.require_credential(), Err(Error::MissingCredential)));
    }

    #[test]
    fn test_status_message_hides_contract_details() {
        let user = PipelineError::new(
            PipelineState::Translating,
            Error::provider_failure(Some(400), Some("Invalid target language".into())),
        );
        assert_eq!(user.status_message(), "Error: Invalid target language");

        let internal = PipelineError::new(
            PipelineState::Reassembling,
            Error::LengthMismatch { expected: 3, actual: 2 },
        );
        assert_eq!(internal.status_message(), "Error: internal failure while reassembling");
    }
}
