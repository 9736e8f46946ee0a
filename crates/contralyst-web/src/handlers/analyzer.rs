//! POST /api/legal_contract_analyzer: the relay endpoint.
//!
//! Always answers 200 with an Extraction Result. Where it came from is
//! reported in headers only, so the body matches what upstreams return.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::warn;

use contralyst_relay::RelayOutcome;

use crate::state::SharedState;

pub const SOURCE_HEADER: HeaderName = HeaderName::from_static("x-extraction-source");
pub const CACHE_HEADER: HeaderName = HeaderName::from_static("x-cache");
pub const UPSTREAM_HEADER: HeaderName = HeaderName::from_static("x-upstream");

/// Read the request body, treating anything that is not a JSON object as `{}`.
pub fn parse_request(body: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) if value.is_object() => value,
        Ok(_) => {
            warn!("Analyzer request body is not a JSON object, treating as empty");
            Value::Object(Default::default())
        }
        Err(e) => {
            if !body.is_empty() {
                warn!(error = %e, "Malformed analyzer request body, treating as empty");
            }
            Value::Object(Default::default())
        }
    }
}

fn outcome_headers(outcome: &RelayOutcome) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(SOURCE_HEADER, HeaderValue::from_static(outcome.source.as_str()));
    headers.insert(
        CACHE_HEADER,
        HeaderValue::from_static(if outcome.cache_hit { "hit" } else { "miss" }),
    );
    if let Some(value) = outcome.upstream.as_deref().and_then(|n| HeaderValue::from_str(n).ok()) {
        headers.insert(UPSTREAM_HEADER, value);
    }
    headers
}

pub async fn analyze_contract(
    State(state): State<SharedState>,
    body: Bytes,
) -> impl IntoResponse {
    let request = parse_request(&body);
    let outcome = state.relay.analyze(request).await;
    let headers = outcome_headers(&outcome);
    (headers, Json(outcome.payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contralyst_common::ResultSource;

    #[test]
    fn test_parse_request_accepts_objects() {
        let v = parse_request(br#"{"legal_contract":"abc","extra":1}"#);
        assert_eq!(v["legal_contract"], "abc");
        assert_eq!(v["extra"], 1);
    }

    #[test]
    fn test_parse_request_lenient() {
        assert_eq!(parse_request(b""), serde_json::json!({}));
        assert_eq!(parse_request(b"not json"), serde_json::json!({}));
        assert_eq!(parse_request(b"[1,2,3]"), serde_json::json!({}));
        assert_eq!(parse_request(b"\"text\""), serde_json::json!({}));
    }

    #[test]
    fn test_headers_for_synthesized_miss() {
        let outcome = RelayOutcome {
            payload: serde_json::json!({}),
            source: ResultSource::Synthesized,
            upstream: None,
            cache_hit: false,
        };
        let h = outcome_headers(&outcome);
        assert_eq!(h[&SOURCE_HEADER], "synthesized");
        assert_eq!(h[&CACHE_HEADER], "miss");
        assert!(h.get(&UPSTREAM_HEADER).is_none());
    }

    #[test]
    fn test_headers_for_upstream_hit() {
        let outcome = RelayOutcome {
            payload: serde_json::json!({}),
            source: ResultSource::Upstream,
            upstream: Some("primary".to_string()),
            cache_hit: true,
        };
        let h = outcome_headers(&outcome);
        assert_eq!(h[&SOURCE_HEADER], "upstream");
        assert_eq!(h[&CACHE_HEADER], "hit");
        assert_eq!(h[&UPSTREAM_HEADER], "primary");
    }
}
