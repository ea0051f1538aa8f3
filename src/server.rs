/*!
 * HTTP surface for the translation engine.
 *
 * - `POST /translate` with `{"texts": [...]}` returns `{text: translation}`
 * - `GET /stats` returns engine statistics
 * - `GET /health` returns `ok`
 */

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use log::{error, info};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::EngineError;
use crate::translation::{EngineStats, TranslationEngine};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TranslationEngine>,
}

/// Body of `POST /translate`
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub texts: Vec<String>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn unavailable(e: EngineError) -> ApiError {
    error!("Request failed: {}", e);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
}

async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<HashMap<String, String>>, ApiError> {
    info!("Received {} texts to translate", request.texts.len());
    let mapping = state
        .engine
        .resolve_map(&request.texts)
        .await
        .map_err(unavailable)?;
    Ok(Json(mapping))
}

async fn stats(State(state): State<AppState>) -> Result<Json<EngineStats>, ApiError> {
    state.engine.stats().await.map(Json).map_err(unavailable)
}

async fn health() -> &'static str {
    "ok"
}

/// Build the router around `engine`
pub fn create_router(engine: Arc<TranslationEngine>) -> Router {
    Router::new()
        .route("/translate", post(translate))
        .route("/stats", get(stats))
        .route("/health", get(health))
        .with_state(AppState { engine })
}

/// Bind `address` and serve until the process is stopped
pub async fn serve(engine: Arc<TranslationEngine>, address: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", address, e))?;

    info!("Translation server listening on http://{}", address);

    axum::serve(listener, create_router(engine))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
