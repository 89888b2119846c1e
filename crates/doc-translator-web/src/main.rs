//! Doc Translator Web - Web server for translating text and documents.

mod helpers;
mod routes;
mod state;
mod templates;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, header};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use clap::Parser;
use doc_translator_core::AppConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use state::AppState;

/// Resolve the static files directory.
///
/// Priority:
/// 1. Explicit path if provided
/// 2. ./static if it exists
/// 3. Crate's built-in static directory
fn resolve_static_dir(explicit_path: Option<&str>) -> PathBuf {
    if let Some(path) = explicit_path {
        return PathBuf::from(path);
    }

    let local_static = PathBuf::from("static");
    if local_static.is_dir() {
        return local_static;
    }

    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

#[derive(Parser, Debug)]
#[command(name = "doc-translator-web")]
#[command(author, version, about = "Doc Translator Web Server", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Translation API key used when a request brings none
    #[arg(long, env = "GOOGLE_TRANSLATE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Translation API endpoint
    #[arg(long, env = "TRANSLATE_API_BASE")]
    api_base: Option<String>,

    /// Synonym API key used when a request brings none
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    synonym_api_key: Option<String>,

    /// OpenAI-compatible synonym API base URL
    #[arg(long, env = "SYNONYM_API_BASE")]
    synonym_api_base: Option<String>,

    /// Synonym model name
    #[arg(long, env = "SYNONYM_MODEL")]
    synonym_model: Option<String>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Static files directory (defaults to ./static or crate's static dir)
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<String>,
}

impl Args {
    /// Command line and environment take precedence over the config file.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(key) = &self.api_key {
            config.provider.api_key = Some(key.clone());
        }
        if let Some(base) = &self.api_base {
            config.provider.api_base.clone_from(base);
        }
        if let Some(key) = &self.synonym_api_key {
            config.synonyms.api_key = Some(key.clone());
        }
        if let Some(base) = &self.synonym_api_base {
            config.synonyms.api_base.clone_from(base);
        }
        if let Some(model) = &self.synonym_model {
            config.synonyms.model.clone_from(model);
        }
    }
}

fn app(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    // Uploads and browser-converted HTML can both exceed the raw file ceiling
    let body_limit = state.config.limits.max_file_bytes.saturating_mul(2);

    Router::new()
        // Pages
        .route("/", get(routes::index))
        // API endpoints - JSON
        .route("/api/translate-text", post(routes::translate_text))
        .route("/api/documents", post(routes::upload_document))
        .route("/api/documents/payload", post(routes::upload_payload))
        .route("/api/synonyms", post(routes::suggest_synonyms))
        .route("/api/replace-word", post(routes::replace_word))
        // Jobs - SSE progress, cancellation and file downloads
        .route("/api/jobs/{job_id}/stream", get(routes::job_stream))
        .route("/api/jobs/{job_id}/cancel", post(routes::cancel_job))
        .route("/api/jobs/{job_id}/download", get(routes::download_job))
        // Static files with Cache-Control: no-cache (cache but always revalidate via ETag)
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-cache"),
                ))
                .service(ServeDir::new(static_dir)),
        )
        // Middleware
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        ))
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };
    args.apply(&mut config);

    let state = Arc::new(
        AppState::new(config).context("Failed to initialize application state")?,
    );

    // Spawn background task for job cleanup (runs every 5 minutes)
    let cleanup_state = Arc::clone(&state);
    tokio::spawn(async move {
        let cleanup_interval = Duration::from_secs(5 * 60);
        loop {
            tokio::time::sleep(cleanup_interval).await;
            let removed = cleanup_state.cleanup_old_jobs().await;
            info!("Completed job cleanup, removed {}", removed);
        }
    });

    let app = app(state, resolve_static_dir(args.static_dir.as_deref()));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(test_state(AppConfig::default()), resolve_static_dir(None))
    }

    fn test_state(config: AppConfig) -> Arc<AppState> {
        Arc::new(AppState::new(config).unwrap())
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_index_lists_languages() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Auto-detect"));
        assert!(html.contains("value=\"zh-CN\""));
    }

    #[tokio::test]
    async fn test_replace_word_returns_tokens() {
        let response = test_app()
            .oneshot(json_post(
                "/api/replace-word",
                r#"{"text":"Hola mundo.","index":2,"replacement":"planeta"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["text"], "Hola planeta.");
        assert_eq!(json["tokens"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_text_translation_requires_key() {
        let response = test_app()
            .oneshot(json_post("/api/translate-text", r#"{"text":"Hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Error: Please configure your API key first");
    }

    #[tokio::test]
    async fn test_payload_without_key_is_rejected() {
        let response = test_app()
            .oneshot(json_post(
                "/api/documents/payload",
                r#"{"payload":{"type":"html","html":"<p>Hi</p>"},"file_name":"a.docx"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/jobs/00000000-0000-0000-0000-000000000000/download")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_payload_obeys_file_limits() {
        let mut config = AppConfig::default();
        config.limits.max_file_bytes = 1024;
        let app = app(test_state(config), resolve_static_dir(None));

        let html = format!("<p>{}</p>", "a".repeat(1500));
        let body = serde_json::json!({
            "payload": {"type": "html", "html": html},
            "file_name": "report.docx",
            "api_key": "test-key",
        });
        let response = app
            .clone()
            .oneshot(json_post("/api/documents/payload", &body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body = serde_json::json!({
            "payload": {"type": "html", "html": "<p>Hi</p>"},
            "file_name": "x.png",
            "api_key": "test-key",
        });
        let response = app
            .oneshot(json_post("/api/documents/payload", &body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("unsupported file type 'x.png'"));
    }

    #[tokio::test]
    async fn test_stream_sends_last_progress_before_error() {
        let state = test_state(AppConfig::default());
        let (id, job) = state.create_job("notes.txt").await;
        job.report(&doc_translator_core::Progress::stage(
            doc_translator_core::PipelineState::Translating,
            "Translating part 1 of 1...",
        ));
        job.finish(crate::state::JobOutcome::Failed {
            stage: doc_translator_core::PipelineState::Translating,
            message: "Error: Backend error".to_string(),
        })
        .await;

        let response = app(state, resolve_static_dir(None))
            .oneshot(
                Request::builder()
                    .uri(format!("/api/jobs/{id}/stream"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let text = body_text(response).await;
        let progress = text.find("Translating part 1 of 1...").unwrap();
        let error = text.find("event: error").unwrap();
        assert!(progress < error);
        assert!(text.contains("Error: Backend error"));
        assert!(!text.contains("event: done"));
    }
}
