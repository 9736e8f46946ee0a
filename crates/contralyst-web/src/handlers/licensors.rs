use axum::{extract::State, response::IntoResponse, Json};

use crate::state::SharedState;

/// GET /api/licensors
pub async fn list_licensors(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.licensors.as_ref().clone())
}
