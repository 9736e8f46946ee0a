//! Term categories, highlighting, and server-side extraction runs.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use contralyst_common::{ApiError, ContralystError, ResultSource};
use contralyst_heuristics::{
    highlight, highlight_all, Category, ExtractedTerm, ExtractionSource, ExtractionWorkflow,
};

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub label: &'static str,
}

/// GET /api/terms/categories
pub async fn list_categories() -> impl IntoResponse {
    let categories: Vec<CategoryInfo> = Category::ALL
        .iter()
        .map(|c| CategoryInfo { id: c.id(), label: c.label() })
        .collect();
    Json(categories)
}

#[derive(Debug, Deserialize)]
pub struct HighlightRequest {
    #[serde(default)]
    pub text: String,
    pub category: Option<String>,
}

/// POST /api/terms/highlight
///
/// Without a category every category is scanned. An empty category yields
/// no terms; a category id nobody knows is rejected.
pub async fn highlight_terms(
    Json(req): Json<HighlightRequest>,
) -> Result<Json<Vec<ExtractedTerm>>, ApiError> {
    let terms = match req.category.as_deref().map(str::trim) {
        None => highlight_all(&req.text),
        Some("") => Vec::new(),
        Some(id) if Category::from_id(id).is_none() => {
            return Err(ContralystError::UnknownCategory(id.to_string()).into());
        }
        Some(id) => highlight(&req.text, id),
    };
    Ok(Json(terms))
}

#[derive(Debug, Deserialize)]
pub struct TermExtractionRequest {
    #[serde(default)]
    pub legal_contract: String,
}

#[derive(Debug, Serialize)]
pub struct TermExtractionResponse {
    pub run_id: Uuid,
    pub terms: Vec<ExtractedTerm>,
    pub fallback: bool,
    pub source: Option<ResultSource>,
}

/// POST /api/term_extraction: run the extraction workflow against the
/// in-process relay. Progress is broadcast on /api/events.
pub async fn run_term_extraction(
    State(state): State<SharedState>,
    Json(req): Json<TermExtractionRequest>,
) -> Result<Json<TermExtractionResponse>, ApiError> {
    let source: Arc<dyn ExtractionSource> = state.relay.clone();
    let mut workflow =
        ExtractionWorkflow::with_events(source, state.workflow_timings(), state.event_tx.clone());

    let report = workflow
        .run(&req.legal_contract)
        .await
        .map_err(|e| ContralystError::Workflow(e.to_string()))?;

    Ok(Json(TermExtractionResponse {
        run_id: report.run_id,
        terms: report.terms,
        fallback: report.fallback,
        source: report.source,
    }))
}
