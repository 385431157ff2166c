//! HTTP server for the image relay
//!
//! Provides /health, upload, image retrieval and deletion endpoints.

use crate::config::RelayConfig;
use crate::error::AppError;
use crate::types::{HealthResponse, UploadQuery, UploadResponse, IMMUTABLE_MAX_AGE_SECS};
use crate::upload::{read_upload, sniff_format};
use axum::{
    body::Body,
    extract::{rejection::QueryRejection, DefaultBodyLimit, Path, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use expiring_blob_store::{BlobEntry, BlobStore, Token};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};

/// Shared state for the HTTP server
pub struct ServerState {
    pub store: BlobStore,
    pub config: RelayConfig,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(store: BlobStore, config: RelayConfig) -> Self {
        Self {
            store,
            config,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let static_dir = state.config.static_dir.clone();

    let router = Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/api/upload", post(upload))
        .route("/images/{file}", get(get_image).delete(delete_image))
        .route("/api/images/{file}", get(get_image))
        .route("/view/{token}", get(get_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state);

    match static_dir {
        Some(dir) => {
            info!(static_dir = ?dir, "Serving static files");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    }
}

/// Start the HTTP server and run until ctrl-c
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let store_stats = state.store.stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        backend: state.store.backend_name().to_string(),
        store: store_stats,
    })
}

/// Pick the TTL for an upload: the requested one if allowed, else the default
fn resolve_ttl(config: &RelayConfig, requested: Option<u64>) -> Result<Option<Duration>, AppError> {
    match requested {
        None => Ok(config.default_ttl),
        Some(secs) if (1..=config.max_ttl.as_secs()).contains(&secs) => {
            Ok(Some(Duration::from_secs(secs)))
        }
        Some(_) => Err(AppError::BadRequest(format!(
            "ttl must be between 1 and {} seconds",
            config.max_ttl.as_secs()
        ))),
    }
}

/// Accept an image and return the URLs it can be fetched from
async fn upload(
    State(state): State<SharedState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<UploadResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let ttl = resolve_ttl(&state.config, query.ttl)?;

    let content = read_upload(request).await?;
    let format = sniff_format(&content);

    let token = Token::generate()?;
    let entry = state.store.put(token, content, ttl).await?;

    info!(
        token = %entry.token,
        size = entry.size(),
        content_type = format.mime,
        backend = state.store.backend_name(),
        ttl_secs = ttl.map(|t| t.as_secs()),
        "Stored upload"
    );

    Ok(Json(UploadResponse::for_entry(
        &entry,
        &state.config.public_url,
        format.extension,
    )))
}

/// `{token}` or `{token}.{ext}` from a path segment. Anything that does not
/// parse can never have been issued.
fn token_from_path(file: &str) -> Option<Token> {
    let raw = file.split_once('.').map_or(file, |(token, _ext)| token);
    Token::parse(raw).ok()
}

fn image_response(entry: BlobEntry) -> Response {
    let max_age = entry
        .remaining_secs(Utc::now())
        .unwrap_or(IMMUTABLE_MAX_AGE_SECS);
    let content_type = sniff_format(&entry.content).mime;

    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CACHE_CONTROL, format!("public, max-age={}", max_age)),
        ],
        Body::from(entry.content),
    )
        .into_response()
}

/// Serve a stored image
async fn get_image(
    State(state): State<SharedState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let entry = match token_from_path(&file) {
        Some(token) => state.store.entry(&token).await,
        None => None,
    }
    .ok_or_else(|| AppError::NotFound("Image not found".into()))?;

    Ok(image_response(entry))
}

/// Remove a stored image; absent or unknown images are not an error
async fn delete_image(State(state): State<SharedState>, Path(file): Path<String>) -> StatusCode {
    if let Some(token) = token_from_path(&file) {
        if state.store.delete(&token).await {
            info!(token = %token, "Deleted upload");
        }
    }
    StatusCode::NO_CONTENT
}
