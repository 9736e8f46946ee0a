//! contralyst-relay: Forwards contract text to analyzer upstreams.
//!
//! On a cache miss every configured upstream is raced with an independent
//! timeout; the first success wins. When all of them fail the shared
//! heuristics synthesize a result instead, so callers always get an answer.
//! The outcome records which of the two happened.

pub mod cache;
pub mod client;
pub mod error;
pub mod relay;
pub mod upstream;

pub use cache::{CacheKey, CacheKeyer, CachedResponse, LruResponseCache, ResponseCache};
pub use client::RelayClient;
pub use error::RelayError;
pub use relay::{Relay, RelayOutcome};
pub use upstream::{HttpUpstream, Upstream};

use std::sync::Arc;

use contralyst_config::Config;

/// Build a relay with HTTP upstreams and an LRU cache from configuration.
pub fn build_relay(config: &Config) -> Result<Relay, RelayError> {
    let client = reqwest::Client::builder()
        .timeout(config.relay.timeout())
        .build()?;

    let upstreams: Vec<Arc<dyn Upstream>> = config
        .relay
        .upstreams
        .iter()
        .map(|u| Arc::new(HttpUpstream::new(&u.name, &u.url, client.clone())) as Arc<dyn Upstream>)
        .collect();

    let cache = Arc::new(LruResponseCache::new(config.cache.capacity, config.cache.ttl()));
    let keyer = CacheKeyer::new(config.cache.key, config.cache.prefix_chars);

    tracing::info!(
        n_upstreams = upstreams.len(),
        timeout_ms = config.relay.timeout_ms,
        cache_capacity = config.cache.capacity,
        cache_key = ?config.cache.key,
        "Relay configured"
    );

    Ok(Relay::new(upstreams, cache, keyer, config.relay.timeout())
        .with_log_preview(config.relay.log_preview_chars))
}
