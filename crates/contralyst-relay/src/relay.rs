//! The extraction relay.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use contralyst_common::ResultSource;
use contralyst_heuristics::{synthesize, ExtractionSource, SourcedExtraction, WorkflowError};

use crate::cache::{CacheKeyer, CachedResponse, ResponseCache};
use crate::error::RelayError;
use crate::upstream::Upstream;

/// What the relay answered and how it got there.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayOutcome {
    pub payload: Value,
    pub source: ResultSource,
    pub upstream: Option<String>,
    pub cache_hit: bool,
}

pub struct Relay {
    upstreams: Vec<Arc<dyn Upstream>>,
    cache: Arc<dyn ResponseCache>,
    keyer: CacheKeyer,
    timeout: Duration,
    log_preview_chars: usize,
}

/// The `legal_contract` field of a request body; anything else reads as "".
pub fn contract_text(body: &Value) -> &str {
    body.get("legal_contract").and_then(Value::as_str).unwrap_or("")
}

fn preview(text: &str, chars: usize) -> String {
    let mut p: String = text.chars().take(chars).collect();
    if p.len() < text.len() {
        p.push_str("...");
    }
    p
}

impl Relay {
    pub fn new(
        upstreams: Vec<Arc<dyn Upstream>>,
        cache: Arc<dyn ResponseCache>,
        keyer: CacheKeyer,
        timeout: Duration,
    ) -> Self {
        Self { upstreams, cache, keyer, timeout, log_preview_chars: 200 }
    }

    pub fn with_log_preview(mut self, chars: usize) -> Self {
        self.log_preview_chars = chars;
        self
    }

    pub fn upstream_names(&self) -> Vec<String> {
        self.upstreams.iter().map(|u| u.name().to_string()).collect()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Answer an analyzer request. Never fails: upstream trouble is masked by
    /// a synthesized result, and the outcome says which one the caller got.
    pub async fn analyze(&self, body: Value) -> RelayOutcome {
        let text = contract_text(&body);
        let key = self.keyer.key(text);

        if let Some(hit) = self.cache.get(&key) {
            debug!(source = hit.source.as_str(), "Returning cached response");
            return RelayOutcome {
                payload: hit.payload,
                source: hit.source,
                upstream: hit.upstream,
                cache_hit: true,
            };
        }

        info!(
            text_len = text.len(),
            preview = %preview(text, self.log_preview_chars),
            "Relaying contract to analyzer upstreams"
        );

        let (payload, source, upstream) = match self.race(&body).await {
            Ok((name, payload)) => (payload, ResultSource::Upstream, Some(name)),
            Err(e) => {
                warn!(error = %e, "No upstream answered, synthesizing extraction");
                (synthesized_payload(text), ResultSource::Synthesized, None)
            }
        };

        self.cache.insert(key, CachedResponse::new(payload.clone(), source, upstream.clone()));

        RelayOutcome { payload, source, upstream, cache_hit: false }
    }

    /// Send `body` to every upstream at once; first success wins.
    async fn race(&self, body: &Value) -> Result<(String, Value), RelayError> {
        if self.upstreams.is_empty() {
            return Err(RelayError::NoUpstreams);
        }

        let timeout = self.timeout;
        let mut pending: FuturesUnordered<_> = self
            .upstreams
            .iter()
            .map(|upstream| async move {
                let result = match tokio::time::timeout(timeout, upstream.analyze(body)).await {
                    Ok(r) => r,
                    Err(_) => Err(RelayError::Timeout(timeout)),
                };
                (upstream.name().to_string(), result)
            })
            .collect();

        let mut failures = Vec::new();
        while let Some((name, result)) = pending.next().await {
            match result {
                Ok(payload) => {
                    let snippet: String = payload.to_string().chars().take(200).collect();
                    info!(upstream = %name, response = %snippet, "Upstream answered");
                    return Ok((name, payload));
                }
                Err(e) => {
                    warn!(upstream = %name, error = %e, "Failed to reach upstream");
                    failures.push(format!("{name}: {e}"));
                }
            }
        }
        Err(RelayError::AllFailed(failures))
    }
}

fn synthesized_payload(text: &str) -> Value {
    serde_json::to_value(synthesize(text)).unwrap_or_else(|e| {
        error!(error = %e, "Failed to serialize synthesized extraction");
        Value::Object(Default::default())
    })
}

#[async_trait]
impl ExtractionSource for Relay {
    async fn extract(&self, text: &str) -> Result<SourcedExtraction, WorkflowError> {
        let outcome = self.analyze(serde_json::json!({ "legal_contract": text })).await;
        Ok(SourcedExtraction { payload: outcome.payload, source: outcome.source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LruResponseCache;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        name: &'static str,
        delay: Duration,
        answer: Option<Value>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn ok(name: &'static str, delay_ms: u64, answer: Value) -> Arc<Self> {
            Arc::new(Self { name, delay: Duration::from_millis(delay_ms), answer: Some(answer), calls: AtomicUsize::new(0) })
        }

        fn failing(name: &'static str, delay_ms: u64) -> Arc<Self> {
            Arc::new(Self { name, delay: Duration::from_millis(delay_ms), answer: None, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl Upstream for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn analyze(&self, _body: &Value) -> Result<Value, RelayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.answer.clone().ok_or(RelayError::Status { status: 502, message: "bad gateway".into() })
        }
    }

    fn relay(upstreams: Vec<Arc<dyn Upstream>>, keyer: CacheKeyer) -> Relay {
        Relay::new(upstreams, Arc::new(LruResponseCache::new(16, None)), keyer, Duration::from_secs(3))
    }

    fn body(text: &str) -> Value {
        serde_json::json!({ "legal_contract": text })
    }

    #[test]
    fn test_contract_text_extraction() {
        assert_eq!(contract_text(&body("abc")), "abc");
        assert_eq!(contract_text(&serde_json::json!({})), "");
        assert_eq!(contract_text(&serde_json::json!({ "legal_contract": 42 })), "");
        assert_eq!(contract_text(&Value::Null), "");
    }

    #[test]
    fn test_preview_truncates_by_chars() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("abc", 3), "abc");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fastest_success_wins() {
        let slow = Fixed::ok("slow", 2000, serde_json::json!({ "from": "slow" }));
        let fast = Fixed::ok("fast", 100, serde_json::json!({ "from": "fast" }));
        let broken = Fixed::failing("broken", 10);
        let r = relay(vec![slow, fast, broken], CacheKeyer::content_hash());

        let out = r.analyze(body("x")).await;
        assert_eq!(out.payload["from"], "fast");
        assert_eq!(out.source, ResultSource::Upstream);
        assert_eq!(out.upstream.as_deref(), Some("fast"));
        assert!(!out.cache_hit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure() {
        let hung = Fixed::ok("hung", 10_000, serde_json::json!({ "from": "hung" }));
        let r = relay(vec![hung], CacheKeyer::content_hash());

        let out = r.analyze(body("minimum guarantee of $12,500")).await;
        assert_eq!(out.source, ResultSource::Synthesized);
        assert_eq!(out.payload["minimum_guarantee"], "$12,500");
    }

    #[tokio::test]
    async fn test_no_upstreams_synthesizes() {
        let r = relay(vec![], CacheKeyer::content_hash());
        let out = r.analyze(body("Payment due in 45 days")).await;
        assert_eq!(out.source, ResultSource::Synthesized);
        assert_eq!(out.payload["report_fields"][2]["field_description"], "Payment due within 45 days");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_upstreams() {
        let up = Fixed::ok("only", 0, serde_json::json!({ "n": 1 }));
        let r = relay(vec![up.clone()], CacheKeyer::content_hash());

        let first = r.analyze(body("same text")).await;
        let second = r.analyze(body("same text")).await;

        assert_eq!(up.calls.load(Ordering::SeqCst), 1);
        assert!(second.cache_hit);
        assert_eq!(first.payload, second.payload);
        assert_eq!(second.upstream.as_deref(), Some("only"));
        assert_eq!(r.cache_len(), 1);
    }

    #[tokio::test]
    async fn test_synthesized_results_are_cached() {
        let broken = Fixed::failing("broken", 0);
        let r = relay(vec![broken.clone()], CacheKeyer::content_hash());

        r.analyze(body("15% royalty")).await;
        let again = r.analyze(body("15% royalty")).await;

        assert!(again.cache_hit);
        assert_eq!(again.source, ResultSource::Synthesized);
        assert_eq!(broken.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_workflow_source_impl_never_fails() {
        let r = relay(vec![Fixed::failing("broken", 0)], CacheKeyer::content_hash());
        let got = r.extract("advance of $3,000").await.unwrap();
        assert_eq!(got.source, ResultSource::Synthesized);
        assert_eq!(got.payload["advance"], "$3,000");
    }
}
