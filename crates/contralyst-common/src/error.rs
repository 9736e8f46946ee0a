use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContralystError {
    #[error("Unknown term category: {0}")]
    UnknownCategory(String),

    #[error("Workflow error: {0}")]
    Workflow(String),
}

/// Errors returned by the JSON API handlers.
///
/// The contract analyzer endpoint never produces one of these; it always
/// answers 200. Only the auxiliary endpoints use them.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ContralystError> for ApiError {
    fn from(err: ContralystError) -> Self {
        match err {
            ContralystError::UnknownCategory(c) => ApiError::BadRequest(format!("unknown category '{}'", c)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "API request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
