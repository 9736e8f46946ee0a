use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("upstream returned [{status}]: {message}")]
    Status { status: u16, message: String },
    #[error("upstream response was not JSON: {0}")]
    Decode(String),
    #[error("no upstreams configured")]
    NoUpstreams,
    #[error("all upstreams failed: {}", .0.join("; "))]
    AllFailed(Vec<String>),
}
