//! HTTP client for a running relay server.
//!
//! Lets the extraction workflow run in a separate process from the relay,
//! the same way the browser client does.

use async_trait::async_trait;

use contralyst_common::ResultSource;
use contralyst_heuristics::{ExtractionSource, SourcedExtraction, WorkflowError};

use crate::error::RelayError;
use crate::upstream::check_response_status;

pub const ANALYZER_PATH: &str = "/api/legal_contract_analyzer";
pub const SOURCE_HEADER: &str = "x-extraction-source";

pub struct RelayClient {
    base_url: String,
    client: reqwest::Client,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    /// POST the contract to the relay. A missing or unrecognised source header
    /// is reported as `Upstream`, which is all an older relay could return.
    pub async fn analyze(&self, text: &str) -> Result<SourcedExtraction, RelayError> {
        let url = format!("{}{}", self.base_url, ANALYZER_PATH);
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "legal_contract": text }))
            .send()
            .await?;

        let source = resp
            .headers()
            .get(SOURCE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(ResultSource::parse)
            .unwrap_or(ResultSource::Upstream);
        let payload = check_response_status(resp).await?;

        Ok(SourcedExtraction { payload, source })
    }
}

#[async_trait]
impl ExtractionSource for RelayClient {
    async fn extract(&self, text: &str) -> Result<SourcedExtraction, WorkflowError> {
        self.analyze(text)
            .await
            .map_err(|e| WorkflowError::Source(e.to_string()))
    }
}
