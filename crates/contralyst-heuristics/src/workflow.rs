//! Term-extraction workflow: `idle → scanning → analyzing → mapping → complete`.
//!
//! A run is linear and cannot be cancelled. Scanning and mapping are fixed
//! delays (cosmetic, configurable); analyzing calls an [`ExtractionSource`].
//! If the source fails, the run jumps straight to `complete` with terms from
//! the local highlighter. Every transition is broadcast as a [`WorkflowEvent`].

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use contralyst_common::{ExtractionResult, ResultSource};

use crate::category::Category;
use crate::highlighter::{highlight_all_with_rng, ExtractedTerm};
use crate::mapping::map_result_to_terms;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid workflow transition: {from:?} -> {to:?}")]
    InvalidTransition { from: WorkflowState, to: WorkflowState },
    #[error("extraction source failed: {0}")]
    Source(String),
}

// ── Source ────────────────────────────────────────────────────────────────────

/// A relay result together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedExtraction {
    pub payload: Value,
    pub source: ResultSource,
}

/// Anything that can turn contract text into a relay result: the in-process
/// relay, or a client talking to one over HTTP.
#[async_trait]
pub trait ExtractionSource: Send + Sync {
    async fn extract(&self, text: &str) -> Result<SourcedExtraction, WorkflowError>;
}

// ── State / events ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    Scanning,
    Analyzing,
    Mapping,
    Complete,
}

impl WorkflowState {
    fn can_transition_to(self, next: WorkflowState) -> bool {
        use WorkflowState::*;
        matches!(
            (self, next),
            (Idle, Scanning)
                | (Complete, Scanning)
                | (Scanning, Analyzing)
                | (Analyzing, Mapping)
                | (Analyzing, Complete)
                | (Mapping, Complete)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    StateChanged {
        run_id: Uuid,
        state: WorkflowState,
        at: DateTime<Utc>,
    },
    TermsCommitted {
        run_id: Uuid,
        count: usize,
        fallback: bool,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct WorkflowTimings {
    pub scan: Duration,
    pub mapping: Duration,
}

impl Default for WorkflowTimings {
    fn default() -> Self {
        Self {
            scan: Duration::from_secs(3),
            mapping: Duration::from_secs(2),
        }
    }
}

impl WorkflowTimings {
    /// No delays; for tests and server-side runs that want results immediately.
    pub fn immediate() -> Self {
        Self { scan: Duration::ZERO, mapping: Duration::ZERO }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub terms: Vec<ExtractedTerm>,
    /// True when the source failed and local heuristics supplied the terms.
    pub fallback: bool,
    pub source: Option<ResultSource>,
    pub completed_categories: Vec<Category>,
}

// ── Workflow ──────────────────────────────────────────────────────────────────

pub struct ExtractionWorkflow {
    source: Arc<dyn ExtractionSource>,
    timings: WorkflowTimings,
    state: WorkflowState,
    terms: Vec<ExtractedTerm>,
    completed: BTreeSet<Category>,
    events: broadcast::Sender<WorkflowEvent>,
    rng: StdRng,
}

impl ExtractionWorkflow {
    pub fn new(source: Arc<dyn ExtractionSource>, timings: WorkflowTimings) -> Self {
        let (events, _) = broadcast::channel(64);
        Self::with_events(source, timings, events)
    }

    /// Publish events on an existing channel (e.g. the server's SSE feed).
    pub fn with_events(
        source: Arc<dyn ExtractionSource>,
        timings: WorkflowTimings,
        events: broadcast::Sender<WorkflowEvent>,
    ) -> Self {
        Self {
            source,
            timings,
            state: WorkflowState::Idle,
            terms: Vec::new(),
            completed: BTreeSet::new(),
            events,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fix the confidence jitter seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn terms(&self) -> &[ExtractedTerm] {
        &self.terms
    }

    pub fn completed_categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.completed.iter().copied()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    /// Discard extracted terms and return to `idle`.
    pub fn refresh(&mut self) {
        self.terms.clear();
        self.completed.clear();
        self.state = WorkflowState::Idle;
    }

    fn transition(&mut self, run_id: Uuid, next: WorkflowState) -> Result<(), WorkflowError> {
        if !self.state.can_transition_to(next) {
            return Err(WorkflowError::InvalidTransition { from: self.state, to: next });
        }
        self.state = next;
        // No subscribers is fine
        let _ = self.events.send(WorkflowEvent::StateChanged { run_id, state: next, at: Utc::now() });
        Ok(())
    }

    /// Run the whole pipeline over `text`.
    ///
    /// Starting again after `complete` re-runs from `scanning`. A run whose
    /// future was dropped midway is abandoned and the workflow restarts clean.
    pub async fn run(&mut self, text: &str) -> Result<RunReport, WorkflowError> {
        if !matches!(self.state, WorkflowState::Idle | WorkflowState::Complete) {
            warn!(state = ?self.state, "Abandoned run detected, restarting");
        }
        self.refresh();

        let run_id = Uuid::new_v4();
        info!(%run_id, text_len = text.len(), "Starting term extraction");

        self.transition(run_id, WorkflowState::Scanning)?;
        tokio::time::sleep(self.timings.scan).await;

        self.transition(run_id, WorkflowState::Analyzing)?;
        let outcome = self.source.extract(text).await;
        let (terms, fallback, source) = match outcome {
            Ok(extraction) => {
                self.transition(run_id, WorkflowState::Mapping)?;
                let result = ExtractionResult::from_value(&extraction.payload);
                let terms = map_result_to_terms(&result, text, &mut self.rng);
                tokio::time::sleep(self.timings.mapping).await;
                (terms, false, Some(extraction.source))
            }
            Err(e) => {
                warn!(%run_id, error = %e, "Extraction source failed, using local heuristics");
                (highlight_all_with_rng(text, &mut self.rng), true, None)
            }
        };

        self.terms = terms;
        self.completed = Category::ALL.iter().copied().collect();
        self.transition(run_id, WorkflowState::Complete)?;
        let _ = self.events.send(WorkflowEvent::TermsCommitted {
            run_id,
            count: self.terms.len(),
            fallback,
        });
        info!(%run_id, n_terms = self.terms.len(), fallback, "Term extraction complete");

        Ok(RunReport {
            run_id,
            terms: self.terms.clone(),
            fallback,
            source,
            completed_categories: self.completed.iter().copied().collect(),
        })
    }
}
