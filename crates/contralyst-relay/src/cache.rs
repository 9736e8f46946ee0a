//! Response cache for relay results.
//!
//! Keys are derived from the contract text either as the first N characters
//! (near-duplicate contracts share an entry) or as a SHA-256 content hash.
//! The default implementation is an LRU, optionally bounded, with optional
//! expiry.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use lru::LruCache;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::time::Instant;

use contralyst_common::ResultSource;
use contralyst_config::CacheKeyStrategy;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Derives cache keys from contract text.
#[derive(Debug, Clone, Copy)]
pub struct CacheKeyer {
    strategy: CacheKeyStrategy,
    prefix_chars: usize,
}

impl CacheKeyer {
    pub fn new(strategy: CacheKeyStrategy, prefix_chars: usize) -> Self {
        Self { strategy, prefix_chars }
    }

    pub fn content_hash() -> Self {
        Self::new(CacheKeyStrategy::ContentHash, 0)
    }

    pub fn prefix(chars: usize) -> Self {
        Self::new(CacheKeyStrategy::Prefix, chars)
    }

    pub fn key(&self, text: &str) -> CacheKey {
        match self.strategy {
            CacheKeyStrategy::ContentHash => {
                let mut hasher = Sha256::new();
                hasher.update(text.as_bytes());
                CacheKey(format!("sha256:{:x}", hasher.finalize()))
            }
            CacheKeyStrategy::Prefix => {
                let prefix: String = text.chars().take(self.prefix_chars).collect();
                CacheKey(format!("prefix:{}", prefix))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub payload: Value,
    pub source: ResultSource,
    /// Name of the upstream that produced the payload, if any.
    pub upstream: Option<String>,
    pub inserted_at: Instant,
}

impl CachedResponse {
    pub fn new(payload: Value, source: ResultSource, upstream: Option<String>) -> Self {
        Self { payload, source, upstream, inserted_at: Instant::now() }
    }
}

/// Cache injected into the relay.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CachedResponse>;
    fn insert(&self, key: CacheKey, value: CachedResponse);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct LruResponseCache {
    inner: Mutex<LruCache<CacheKey, CachedResponse>>,
    ttl: Option<Duration>,
}

impl LruResponseCache {
    /// A `capacity` of zero never evicts.
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let inner = match NonZeroUsize::new(capacity) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self { inner: Mutex::new(inner), ttl }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, CachedResponse>> {
        // A panic while holding the lock cannot leave the LRU half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_expired(&self, entry: &CachedResponse) -> bool {
        self.ttl.is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }
}

impl ResponseCache for LruResponseCache {
    fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        let mut cache = self.lock();
        let expired = match cache.get(key) {
            Some(entry) if !self.is_expired(entry) => return Some(entry.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            cache.pop(key);
            tracing::debug!(key = %key.as_str(), "Cache entry expired");
        }
        None
    }

    fn insert(&self, key: CacheKey, value: CachedResponse) {
        self.lock().put(key, value);
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contralyst_test_utils::fixtures;

    fn entry(tag: &str) -> CachedResponse {
        CachedResponse::new(serde_json::json!({ "tag": tag }), ResultSource::Synthesized, None)
    }

    #[test]
    fn test_prefix_keys_collide_after_limit() {
        let keyer = CacheKeyer::prefix(100);
        let a = fixtures::contract_with_tail(" advance of $1,000");
        let b = fixtures::contract_with_tail(" advance of $9,000");
        assert_eq!(keyer.key(&a), keyer.key(&b));
    }

    #[test]
    fn test_prefix_counts_characters_not_bytes() {
        let keyer = CacheKeyer::prefix(3);
        assert_eq!(keyer.key("€€€€").as_str(), "prefix:€€€");
    }

    #[test]
    fn test_content_hash_distinguishes_tails() {
        let keyer = CacheKeyer::content_hash();
        let a = fixtures::contract_with_tail(" advance of $1,000");
        let b = fixtures::contract_with_tail(" advance of $9,000");
        assert_ne!(keyer.key(&a), keyer.key(&b));
        assert_eq!(keyer.key(&a), keyer.key(&a.clone()));
        assert!(keyer.key("").as_str().starts_with("sha256:"));
    }

    #[test]
    fn test_lru_evicts_oldest() {
        let cache = LruResponseCache::new(2, None);
        let keyer = CacheKeyer::content_hash();
        cache.insert(keyer.key("a"), entry("a"));
        cache.insert(keyer.key("b"), entry("b"));
        // touch "a" so "b" becomes least recently used
        assert!(cache.get(&keyer.key("a")).is_some());
        cache.insert(keyer.key("c"), entry("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&keyer.key("b")).is_none());
        assert!(cache.get(&keyer.key("a")).is_some());
        assert!(cache.get(&keyer.key("c")).is_some());
    }

    #[test]
    fn test_zero_capacity_never_evicts() {
        let cache = LruResponseCache::new(0, None);
        let keyer = CacheKeyer::content_hash();
        for i in 0..5000 {
            cache.insert(keyer.key(&i.to_string()), entry("x"));
        }
        assert_eq!(cache.len(), 5000);
        assert!(cache.get(&keyer.key("0")).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let cache = LruResponseCache::new(8, Some(Duration::from_secs(60)));
        let key = CacheKeyer::content_hash().key("contract");
        cache.insert(key.clone(), entry("v"));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(cache.get(&key).is_some());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }
}
