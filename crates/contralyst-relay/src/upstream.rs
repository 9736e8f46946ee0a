//! Analyzer upstreams.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RelayError;

/// One candidate analyzer endpoint.
#[async_trait]
pub trait Upstream: Send + Sync {
    fn name(&self) -> &str;
    /// Forward the request body verbatim and return the analyzer's JSON.
    async fn analyze(&self, body: &Value) -> Result<Value, RelayError>;
}

// ── HTTP ──────────────────────────────────────────────────────────────────────

pub struct HttpUpstream {
    pub name: String,
    pub url: String,
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new(name: impl Into<String>, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self { name: name.into(), url: url.into(), client }
    }
}

/// Turn a non-2xx status into `RelayError::Status` (body cut to 200 chars)
/// and decode anything else as JSON.
pub(crate) async fn check_response_status(resp: reqwest::Response) -> Result<Value, RelayError> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        let message: String = text.chars().take(200).collect();
        return Err(RelayError::Status { status: status.as_u16(), message });
    }
    resp.json::<Value>()
        .await
        .map_err(|e| RelayError::Decode(e.to_string()))
}

#[async_trait]
impl Upstream for HttpUpstream {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(&self, body: &Value) -> Result<Value, RelayError> {
        let resp = self.client.post(&self.url).json(body).send().await?;
        tracing::debug!(upstream = %self.name, status = resp.status().as_u16(), "Upstream responded");
        check_response_status(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn upstream(server: &MockServer) -> HttpUpstream {
        HttpUpstream::new("mock", server.url("/agent/legal_contract_analyzer"), reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_forwards_body_and_returns_json() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/agent/legal_contract_analyzer")
                    .json_body(serde_json::json!({ "legal_contract": "abc", "extra": 1 }));
                then.status(200).json_body(serde_json::json!({ "advance": "$1" }));
            })
            .await;

        let body = serde_json::json!({ "legal_contract": "abc", "extra": 1 });
        let out = upstream(&server).analyze(&body).await.unwrap();

        mock.assert_async().await;
        assert_eq!(out["advance"], "$1");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503).body("overloaded");
            })
            .await;

        let err = upstream(&server).analyze(&serde_json::json!({})).await.unwrap_err();
        match err {
            RelayError::Status { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body("<html>hello</html>");
            })
            .await;

        let err = upstream(&server).analyze(&serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, RelayError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        // Port 9 (discard) is closed on CI hosts
        let up = HttpUpstream::new("dead", "http://127.0.0.1:9/analyze", reqwest::Client::new());
        let err = up.analyze(&serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, RelayError::Http(_)));
    }
}
