//! Axum router: maps all URL paths to handlers.

use axum::{
    http::{header, HeaderValue, Method},
    routing::{any, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use std::sync::Arc;
use tracing::{info, warn};

use contralyst_config::ServerConfig;

use crate::handlers::{
    analyzer::{analyze_contract, CACHE_HEADER, SOURCE_HEADER, UPSTREAM_HEADER},
    licensors::list_licensors,
    system::{api_not_found, health},
    terms::{highlight_terms, list_categories, run_term_extraction},
};
use crate::sse::sse_handler;
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);
    let static_bundle = state.config.server.serves_static().then(|| state.config.server.static_dir.clone());
    let shared: SharedState = Arc::new(state);

    let mut router = Router::new()
        // Relay
        .route("/api/legal_contract_analyzer", post(analyze_contract))
        .route("/api/licensors",               get(list_licensors))

        // Terms
        .route("/api/terms/categories", get(list_categories))
        .route("/api/terms/highlight",  post(highlight_terms))
        .route("/api/term_extraction",  post(run_term_extraction))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        .route("/api/health", get(health))
        .route("/api/{*rest}", any(api_not_found));

    // Production: serve the client bundle, falling back to index.html so
    // client-side routes resolve.
    if let Some(dir) = static_bundle {
        info!(dir = %dir.display(), "Serving client bundle");
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(&dir).fallback(index));
    }

    router
        // Middleware
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([SOURCE_HEADER, CACHE_HEADER, UPSTREAM_HEADER])
        .allow_credentials(true)
}
