//! Workflow progress over Server-Sent Events.
//!
//! Each `WorkflowEvent` goes out as a `workflow` event with a JSON payload.
//! A subscriber that falls more than `EVENT_BUFFER` events behind receives a
//! `lagged` event with the number of events it missed, then resumes with the
//! oldest event still buffered.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_core::Stream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::warn;

use contralyst_heuristics::WorkflowEvent;

use crate::state::SharedState;

pub const WORKFLOW_EVENT: &str = "workflow";
pub const LAGGED_EVENT: &str = "lagged";

fn to_sse(item: Result<WorkflowEvent, BroadcastStreamRecvError>) -> Option<Event> {
    match item {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(data) => Some(Event::default().event(WORKFLOW_EVENT).data(data)),
            Err(e) => {
                warn!(error = %e, "Failed to serialize workflow event");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!(skipped, "SSE subscriber lagged behind workflow events");
            let data = serde_json::json!({ "skipped": skipped }).to_string();
            Some(Event::default().event(LAGGED_EVENT).data(data))
        }
    }
}

/// GET /api/events
pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.subscribe())
        .filter_map(to_sse)
        .map(Ok);

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
