//! Health check and API fallbacks.

use axum::{extract::State, http::Uri, response::IntoResponse, Json};
use serde::Serialize;

use contralyst_common::ApiError;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub environment: &'static str,
    pub cache_entries: usize,
    pub upstreams: Vec<String>,
}

/// GET /api/health
pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.server.environment.as_str(),
        cache_entries: state.relay.cache_len(),
        upstreams: state.relay.upstream_names(),
    })
}

/// Unknown /api/* paths get a JSON 404 instead of the client bundle.
pub async fn api_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
