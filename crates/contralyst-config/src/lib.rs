//! Configuration loading for Contralyst.
//! Reads contralyst.toml from the current directory or the path in CONTRALYST_CONFIG,
//! then applies the PORT and NODE_ENV environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ── Server ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// NODE_ENV semantics: only the literal "production" switches modes.
    pub fn from_node_env(value: &str) -> Self {
        if value.trim() == "production" {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: Environment,
    /// Prebuilt client bundle, served only in production.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host()        -> String      { "0.0.0.0".to_string() }
fn default_port()        -> u16         { 5001 }
fn default_environment() -> Environment { Environment::Development }
fn default_static_dir()  -> PathBuf     { PathBuf::from("client/build") }
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            static_dir: default_static_dir(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl ServerConfig {
    pub fn serves_static(&self) -> bool {
        self.environment == Environment::Production
    }
}

// ── Relay ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Candidate analyzer endpoints, raced on every cache miss.
    #[serde(default = "default_upstreams")]
    pub upstreams: Vec<UpstreamConfig>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Characters of contract text echoed into the request log.
    #[serde(default = "default_log_preview_chars")]
    pub log_preview_chars: usize,
}

fn default_timeout_ms()        -> u64   { 3_000 }
fn default_log_preview_chars() -> usize { 200 }

fn default_upstreams() -> Vec<UpstreamConfig> {
    [
        ("primary", "http://10.189.49.27/agent/legal_contract_analyzer"),
        ("primary-8080", "http://10.189.49.27:8080/agent/legal_contract_analyzer"),
        ("local", "http://localhost:8080/agent/legal_contract_analyzer"),
    ]
    .iter()
    .map(|(name, url)| UpstreamConfig { name: name.to_string(), url: url.to_string() })
    .collect()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            upstreams: default_upstreams(),
            timeout_ms: default_timeout_ms(),
            log_preview_chars: default_log_preview_chars(),
        }
    }
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ── Cache ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeyStrategy {
    /// SHA-256 of the full contract text.
    ContentHash,
    /// First `prefix_chars` characters of the text; near-duplicates collide.
    Prefix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum entries before LRU eviction; 0 means unbounded.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    /// Entry lifetime in seconds; 0 disables expiry.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_key_strategy")]
    pub key: CacheKeyStrategy,
    #[serde(default = "default_prefix_chars")]
    pub prefix_chars: usize,
}

// Entries never expire and are keyed by text prefix unless configured otherwise
fn default_cache_capacity() -> usize            { 0 }
fn default_ttl_secs()       -> u64              { 0 }
fn default_key_strategy()   -> CacheKeyStrategy { CacheKeyStrategy::Prefix }
fn default_prefix_chars()   -> usize            { 100 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_ttl_secs(),
            key: default_key_strategy(),
            prefix_chars: default_prefix_chars(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }
}

// ── Workflow ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_scan_ms")]
    pub scan_ms: u64,
    #[serde(default = "default_mapping_ms")]
    pub mapping_ms: u64,
}

fn default_scan_ms()    -> u64 { 3_000 }
fn default_mapping_ms() -> u64 { 2_000 }

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self { scan_ms: default_scan_ms(), mapping_ms: default_mapping_ms() }
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing-subscriber EnvFilter directive, used when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "info,tower_http=debug".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}


impl Config {
    /// Load configuration from contralyst.toml.
    /// Checks CONTRALYST_CONFIG env var first, then the current directory.
    /// A missing file is not an error: defaults plus env overrides apply.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONTRALYST_CONFIG")
            .unwrap_or_else(|_| "contralyst.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_file(Path::new(&path))?
        } else {
            tracing::debug!(path = %path, "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply PORT and NODE_ENV overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring unparseable PORT"),
            }
        }
        if let Some(env) = lookup("NODE_ENV") {
            self.server.environment = Environment::from_node_env(&env);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.key == CacheKeyStrategy::Prefix && self.cache.prefix_chars == 0 {
            return Err(ConfigError::Invalid("cache.prefix_chars must be at least 1".to_string()));
        }
        if self.relay.timeout_ms == 0 {
            return Err(ConfigError::Invalid("relay.timeout_ms must be positive".to_string()));
        }
        for upstream in &self.relay.upstreams {
            if !(upstream.url.starts_with("http://") || upstream.url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "upstream '{}' has a non-HTTP url: {}",
                    upstream.name, upstream.url
                )));
            }
        }
        Ok(())
    }
}
