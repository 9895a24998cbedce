#![cfg(feature = "web")]

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    response::Html,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::AnalyzeError;
use crate::loader::{self, FileFormat};
use crate::upload::{TempUpload, UploadDir};
use crate::view::{ANALYZE_PATH, FILE_FIELD};

pub struct AppState {
    uploads: UploadDir,
    body_limit: Option<usize>,
}

impl AppState {
    pub fn new(uploads: UploadDir) -> Self {
        AppState {
            uploads,
            body_limit: None,
        }
    }

    pub fn with_body_limit(mut self, limit: Option<usize>) -> Self {
        self.body_limit = limit;
        self
    }
}

#[derive(Serialize)]
struct AnalyzeResponse {
    data: Dataset,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("analyzer=info,website=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the HTTP routes around shared state
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = match state.body_limit {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/", get(serve_index))
        .route("/health", get(health))
        .route(ANALYZE_PATH, post(analyze))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let uploads = UploadDir::create(&config.upload_dir)?;
    info!(dir = %uploads.path().display(), "upload directory ready");

    let state = Arc::new(AppState::new(uploads).with_body_limit(config.body_limit));
    let app = router(state);

    // Start server
    let listener = TcpListener::bind(config.bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    let upload = receive_file(&state.uploads, &mut multipart)
        .await?
        .ok_or(AnalyzeError::MissingFile)?;

    info!(
        upload_id = %upload.id(),
        file = upload.original_name(),
        bytes = upload.bytes_written(),
        "received upload"
    );

    // The guard is dropped on this early return, removing the file.
    let format =
        FileFormat::from_file_name(upload.original_name()).ok_or(AnalyzeError::UnsupportedFormat)?;

    let upload_id = upload.id();
    let data = tokio::task::spawn_blocking(move || {
        let result = loader::load_format(upload.path(), format);
        if let Err(e) = upload.close() {
            warn!(upload_id = %upload_id, error = %e, "failed to remove upload");
        }
        result
    })
    .await??;

    info!(upload_id = %upload_id, rows = data.len(), "analyzed upload");
    Ok(Json(AnalyzeResponse { data }))
}

/// Stream the first `file` field to a temp file; other fields are skipped
async fn receive_file(
    uploads: &UploadDir,
    multipart: &mut Multipart,
) -> Result<Option<TempUpload>, AnalyzeError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let mut upload = uploads.reserve(&name)?;
        while let Some(chunk) = field.chunk().await? {
            upload.write_chunk(&chunk)?;
        }
        upload.finish()?;

        return Ok(Some(upload));
    }

    Ok(None)
}
