use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::article::ArticlePage;
use crate::error::QueryError;
use crate::service::{QueryService, RawHeadlinesParams, RawSearchParams};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QueryService>,
}

impl AppState {
    pub fn new(service: QueryService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// JSON API plus the browser client's static files. Unknown paths fall
/// back to `index.html` so client-side routes survive a reload.
pub fn create_router(state: AppState) -> Router {
    let static_dir = state.service.config().static_dir.clone();
    let spa = ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/top-headlines", get(top_headlines))
        .route("/api/everything", get(everything))
        .fallback_service(spa)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Convenience: build the router straight from a service.
pub fn router(service: QueryService) -> Router {
    create_router(AppState::new(service))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Decoded key/value pairs; an undecodable query string reads as empty.
fn pairs(params: QueryPairs) -> Vec<(String, String)> {
    params.map(|Query(p)| p).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "unreadable query string; using defaults");
        Vec::new()
    })
}

async fn top_headlines(
    State(state): State<AppState>,
    params: QueryPairs,
) -> Result<Json<ArticlePage>, QueryError> {
    let raw = RawHeadlinesParams::from_pairs(&pairs(params));
    state.service.top_headlines(raw).await.map(Json)
}

async fn everything(
    State(state): State<AppState>,
    params: QueryPairs,
) -> Result<Json<ArticlePage>, QueryError> {
    let raw = RawSearchParams::from_pairs(&pairs(params));
    state.service.search(raw).await.map(Json)
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match &self {
            QueryError::NotConfigured(_) => tracing::error!(error = %self, "request refused"),
            _ => tracing::warn!(error = %self, status = status.as_u16(), "request failed"),
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
