use anyhow::{Context, Result};
use doc_translator_core::{
    ApiKey, AppConfig, CancellationFlag, DocumentTranslator, PipelineState, Progress,
    SynonymService, TranslatedContent,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

/// Jobs older than this are dropped by the cleanup task
pub const JOB_MAX_AGE: Duration = Duration::from_secs(3600);

/// How a document job ended
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Finished(TranslatedContent),
    Failed { stage: PipelineState, message: String },
}

/// A background document translation
pub struct Job {
    pub file_name: String,
    pub created_at: Instant,
    pub cancel: CancellationFlag,
    /// Bumped on every progress report so streams only send changes
    version: AtomicUsize,
    progress: Mutex<Progress>,
    outcome: RwLock<Option<JobOutcome>>,
}

impl Job {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            created_at: Instant::now(),
            cancel: CancellationFlag::new(),
            version: AtomicUsize::new(0),
            progress: Mutex::new(Progress::stage(PipelineState::Idle, "Waiting to start...")),
            outcome: RwLock::new(None),
        }
    }

    /// Called from the pipeline's progress callback, which is synchronous.
    pub fn report(&self, progress: &Progress) {
        *self.lock_progress() = progress.clone();
        self.version.fetch_add(1, Ordering::SeqCst);
    }

    pub fn version(&self) -> usize {
        self.version.load(Ordering::SeqCst)
    }

    pub fn progress(&self) -> Progress {
        self.lock_progress().clone()
    }

    /// A panic while holding the lock leaves a whole `Progress` behind, so
    /// the value is still usable.
    fn lock_progress(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(|e| {
            warn!("Progress lock for {} was poisoned", self.file_name);
            PoisonError::into_inner(e)
        })
    }

    pub async fn finish(&self, outcome: JobOutcome) {
        *self.outcome.write().await = Some(outcome);
    }

    pub async fn outcome(&self) -> Option<JobOutcome> {
        self.outcome.read().await.clone()
    }
}

/// Global application state
pub struct AppState {
    pub config: AppConfig,
    pub translator: DocumentTranslator,
    pub synonyms: SynonymService,
    jobs: RwLock<HashMap<Uuid, Arc<Job>>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let synonyms = SynonymService::new(&config.synonyms)
            .context("Failed to create synonym service")?;
        let translator =
            DocumentTranslator::new(config.clone()).context("Failed to create translator")?;
        Ok(Self::with_services(config, translator, synonyms))
    }

    pub fn with_services(
        config: AppConfig,
        translator: DocumentTranslator,
        synonyms: SynonymService,
    ) -> Self {
        Self {
            config,
            translator,
            synonyms,
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Server-side translation key, used when a request brings none.
    pub fn translation_key(&self) -> Option<ApiKey> {
        self.config.provider.default_credential()
    }

    pub fn synonym_key(&self) -> Option<ApiKey> {
        self.config.synonyms.default_credential()
    }

    /// Register a new job and return its id.
    pub async fn create_job(&self, file_name: impl Into<String>) -> (Uuid, Arc<Job>) {
        let id = Uuid::new_v4();
        let job = Arc::new(Job::new(file_name));
        self.jobs.write().await.insert(id, Arc::clone(&job));
        (id, job)
    }

    /// Look up a job by id string.
    ///
    /// Returns `None` if the id is not a valid UUID or the job doesn't exist.
    pub async fn get_job(&self, id: &str) -> Option<Arc<Job>> {
        let uuid = Uuid::parse_str(id).ok()?;
        self.jobs.read().await.get(&uuid).cloned()
    }

    /// Drop jobs older than [`JOB_MAX_AGE`], cancelling any still running.
    pub async fn cleanup_old_jobs(&self) -> usize {
        let mut jobs = self.jobs.write().await;
        let now = Instant::now();
        let before = jobs.len();

        jobs.retain(|_, job| {
            let keep = now.duration_since(job.created_at) < JOB_MAX_AGE;
            if !keep {
                job.cancel.cancel();
            }
            keep
        });

        before - jobs.len()
    }
}
