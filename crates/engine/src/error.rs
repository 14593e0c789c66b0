//! Errors surfaced by the batch change execution engine.

use std::time::Duration;

use srcbatch_api::TransportError;
use srcbatch_types::ResolutionState;
use thiserror::Error;

/// Every way a remote execution run can end other than success.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The instance does not offer server-side batch changes at all.
    ///
    /// Carries no payload; branch on it with `matches!` or
    /// [`BatchError::is_unsupported`].
    #[error("server side batch changes are not available on this Sourcegraph instance")]
    ExecutionUnsupported,

    /// Any other transport or remote failure, unchanged.
    #[error(transparent)]
    Transport(TransportError),

    /// The remote answered but the requested object was absent.
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// Workspace resolution reached a terminal failure state.
    #[error("workspace resolution {state}{}", failure_suffix(.message))]
    ResolutionFailed { state: ResolutionState, message: String },

    /// The caller stopped observing. Nothing is stopped remotely.
    ///
    /// `batch_spec_id` is `None` when cancellation hit before a batch spec was
    /// created.
    #[error("{}", cancelled_message(.batch_spec_id.as_deref()))]
    Cancelled { batch_spec_id: Option<String> },

    /// The poll policy's deadline or attempt cap was reached first.
    #[error(
        "batch spec {batch_spec_id} did not reach a terminal state after {attempts} polls ({}s)",
        whole_seconds(.elapsed)
    )]
    TimedOut {
        batch_spec_id: String,
        attempts: u32,
        elapsed: Duration,
    },
}

impl BatchError {
    /// Whether this is the capability sentinel.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::ExecutionUnsupported)
    }
}

fn whole_seconds(elapsed: &Duration) -> u64 {
    elapsed.as_secs()
}

fn cancelled_message(batch_spec_id: Option<&str>) -> String {
    match batch_spec_id {
        Some(id) => format!("stopped waiting for batch spec {id}; anything already submitted continues on the server"),
        None => "cancelled before a batch spec was created".to_string(),
    }
}

fn failure_suffix(message: &str) -> String {
    if message.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", message.trim())
    }
}
