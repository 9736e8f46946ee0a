//! Shared application state for the web server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use contralyst_common::{default_licensors, Licensor};
use contralyst_config::Config;
use contralyst_heuristics::{WorkflowEvent, WorkflowTimings};
use contralyst_relay::{build_relay, Relay, RelayError};

/// Workflow events buffered per SSE subscriber before it is reported as lagged.
pub const EVENT_BUFFER: usize = 256;

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: Arc<Relay>,
    pub licensors: Arc<Vec<Licensor>>,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<WorkflowEvent>,
}

impl AppState {
    /// Build the relay described by `config`.
    pub fn new(config: Config) -> Result<Self, RelayError> {
        let relay = build_relay(&config)?;
        Ok(Self::with_relay(config, relay))
    }

    pub fn with_relay(config: Config, relay: Relay) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            config: Arc::new(config),
            relay: Arc::new(relay),
            licensors: Arc::new(default_licensors()),
            event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.event_tx.subscribe()
    }

    pub fn workflow_timings(&self) -> WorkflowTimings {
        WorkflowTimings {
            scan: Duration::from_millis(self.config.workflow.scan_ms),
            mapping: Duration::from_millis(self.config.workflow.mapping_ms),
        }
    }
}

pub type SharedState = Arc<AppState>;
