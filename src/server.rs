//! HTTP server.
//!
//! Exposes the upload → summarize → generate workflow as a small JSON API,
//! plus a static upload page.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Upload page |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/save` | Multipart upload; replaces the previous upload |
//! | `POST` | `/llm` | Summarize every uploaded file into the summary store |
//! | `POST` | `/generate_readme` | Generate the README from the summary store |
//! | `POST` | `/generate_docs` | Generate the technical documentation |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "store_missing", "message": "summary store missing: ./output/store.txt" } }
//! ```
//!
//! Error codes: `bad_request` (400), `store_missing` (404), `no_files` (404),
//! `completion_failed` (502), `internal` (500).
//!
//! # Concurrency
//!
//! Upload, summarize and generate share the upload root and the summary
//! store, so they run one at a time behind a single async mutex.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::chunk::{create_splitter, Splitter};
use crate::completion::{create_client, CompletionClient};
use crate::config::Config;
use crate::error::ScribeError;
use crate::generate::{generate, Artifact};
use crate::summarize::summarize_project;
use crate::upload::{sanitize_relative_path, UploadStore};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    client: Arc<dyn CompletionClient>,
    splitter: Arc<dyn Splitter>,
    /// Serializes every operation that touches the upload root or the store.
    run_lock: Arc<Mutex<()>>,
}

/// Starts the HTTP server with the completion client named in the config.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let client: Arc<dyn CompletionClient> = Arc::from(create_client(&config.completion)?);
    run_server_with_client(config, client).await
}

/// Starts the HTTP server with a caller-supplied completion client.
pub async fn run_server_with_client(
    config: &Config,
    client: Arc<dyn CompletionClient>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let splitter: Arc<dyn Splitter> = Arc::from(create_splitter(&config.chunking));

    tracing::info!(
        model = client.model_name(),
        splitter = splitter.name(),
        upload_root = %config.upload.root.display(),
        "starting server"
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        client,
        splitter,
        run_lock: Arc::new(Mutex::new(())),
    };

    let app = router(state, config.server.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/save", post(handle_save))
        .route("/llm", post(handle_summarize))
        .route("/generate_readme", post(handle_generate_readme))
        .route("/generate_docs", post(handle_generate_docs))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"no_files"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

impl From<ScribeError> for AppError {
    fn from(err: ScribeError) -> Self {
        let status = match &err {
            ScribeError::StoreMissing(_) | ScribeError::NoFiles(_) => StatusCode::NOT_FOUND,
            ScribeError::Completion(_) => StatusCode::BAD_GATEWAY,
            ScribeError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            ScribeError::Config(_) | ScribeError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// ============ GET / and /health ============

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /save ============

#[derive(Serialize)]
struct SaveResponse {
    status: String,
    files: Vec<String>,
}

/// Handler for `POST /save`.
///
/// Reads every multipart file part, then resets the upload root and writes
/// them. Each part's file name (falling back to the field name) is its
/// relative path. A malformed request leaves the previous upload untouched.
async fn handle_save(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SaveResponse>, AppError> {
    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {}", e)))?
    {
        // Plain form fields carry no file name and are not files.
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("failed to read upload '{}': {}", name, e)))?;
        parts.push((sanitize_relative_path(&name)?, bytes));
    }
    if parts.is_empty() {
        return Err(bad_request("no files in upload"));
    }

    let _guard = state.run_lock.lock().await;
    let uploads = UploadStore::from_config(&state.config);
    uploads.reset()?;

    let mut files = Vec::with_capacity(parts.len());
    for (name, bytes) in &parts {
        let path = uploads.save(name, bytes)?;
        files.push(path.display().to_string());
    }
    tracing::info!(files = files.len(), "upload saved");

    Ok(Json(SaveResponse {
        status: "saved".to_string(),
        files,
    }))
}

// ============ POST /llm ============

#[derive(Serialize)]
struct SummarizeResponse {
    summaries: Vec<String>,
    files: Vec<String>,
}

async fn handle_summarize(
    State(state): State<AppState>,
) -> Result<Json<SummarizeResponse>, AppError> {
    let _guard = state.run_lock.lock().await;
    let results =
        summarize_project(&state.config, state.client.as_ref(), state.splitter.as_ref()).await?;

    let (files, summaries): (Vec<String>, Vec<String>) = results
        .into_iter()
        .map(|s| (s.path, s.summary))
        .unzip();
    Ok(Json(SummarizeResponse { summaries, files }))
}

// ============ POST /generate_readme, /generate_docs ============

#[derive(Serialize)]
struct GenerateResponse {
    status: String,
    preview: String,
}

async fn handle_generate_readme(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, AppError> {
    run_generate(&state, Artifact::Readme).await
}

async fn handle_generate_docs(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, AppError> {
    run_generate(&state, Artifact::Documentation).await
}

async fn run_generate(
    state: &AppState,
    artifact: Artifact,
) -> Result<Json<GenerateResponse>, AppError> {
    let _guard = state.run_lock.lock().await;
    let preview = generate(&state.config, state.client.as_ref(), artifact).await?;
    Ok(Json(GenerateResponse {
        status: format!("{} generated successfully", artifact.label()),
        preview,
    }))
}
