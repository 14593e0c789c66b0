//! Workspace resolution polling.
//!
//! Polls a batch spec's resolution until the [`PollPolicy`] classifies a
//! snapshot as terminal, a bound trips, or the caller cancels. Each snapshot
//! produces exactly one progress update.

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use srcbatch_api::OperationTransport;
use srcbatch_types::WorkspaceResolution;

use super::policy::{PollPolicy, ResolutionOutcome};
use super::types::ExecutionStage;
use crate::error::BatchError;
use crate::progress::ProgressReporter;
use crate::service::BatchesService;

/// Terminal success snapshot and the number of polls it took.
#[derive(Debug)]
pub(crate) struct PollOutcome {
    pub resolution: WorkspaceResolution,
    pub attempts: u32,
}

/// Poll until the resolution for `batch_spec_id` reaches a terminal state.
///
/// Drives `progress` through one `reset → update* → complete` cycle. Network
/// errors and the capability sentinel are terminal on the attempt that hit
/// them; nothing is retried here.
pub(crate) async fn poll_workspace_resolution<T: OperationTransport>(
    service: &BatchesService<T>,
    batch_spec_id: &str,
    policy: &PollPolicy,
    progress: &mut dyn ProgressReporter,
    cancel: &CancellationToken,
) -> Result<PollOutcome, BatchError> {
    let started_at = Instant::now();
    // A timeout too large to represent as an instant means no deadline.
    let deadline = policy.timeout.and_then(|timeout| started_at.checked_add(timeout));
    let interval = policy.effective_interval();

    info!(
        batch_spec_id,
        interval_ms = interval.as_millis(),
        timeout_s = policy.timeout.map(|timeout| timeout.as_secs()),
        max_attempts = policy.max_attempts,
        "workspace resolution polling started"
    );
    progress.reset(
        ExecutionStage::ResolvingWorkspaces.describe(),
        "Waiting for workspace resolution",
    );

    let mut attempts = 0u32;
    loop {
        if cancel.is_cancelled() {
            return Err(cancelled(batch_spec_id, attempts, progress));
        }

        attempts += 1;
        let snapshot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(batch_spec_id, attempts, progress)),
            snapshot = service.workspace_resolution(batch_spec_id) => snapshot,
        };

        let resolution = match snapshot {
            Ok(Some(resolution)) => resolution,
            Ok(None) => {
                let error = BatchError::NotFound {
                    what: "workspace resolution for batch spec",
                    id: batch_spec_id.to_string(),
                };
                return Err(failed(error, attempts, progress));
            }
            Err(error) => return Err(failed(error, attempts, progress)),
        };

        debug!(batch_spec_id, attempt = attempts, state = %resolution.state, "workspace resolution polled");
        progress.update(&snapshot_message(&resolution));

        match policy.terminal_states.classify(&resolution.state) {
            ResolutionOutcome::Succeeded => {
                info!(batch_spec_id, attempts, state = %resolution.state, "workspace resolution completed");
                progress.complete(&format!("Workspace resolution {}", resolution.state));
                return Ok(PollOutcome { resolution, attempts });
            }
            ResolutionOutcome::Failed => {
                let error = BatchError::ResolutionFailed {
                    state: resolution.state,
                    message: resolution.failure_message,
                };
                return Err(failed(error, attempts, progress));
            }
            ResolutionOutcome::Pending => {}
        }

        let attempts_exhausted = policy.max_attempts.is_some_and(|max_attempts| attempts >= max_attempts);
        let deadline_passed = deadline.is_some_and(|deadline| Instant::now() >= deadline);
        if attempts_exhausted || deadline_passed {
            let error = BatchError::TimedOut {
                batch_spec_id: batch_spec_id.to_string(),
                attempts,
                elapsed: started_at.elapsed(),
            };
            return Err(failed(error, attempts, progress));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(batch_spec_id, attempts, progress)),
            _ = sleep(interval) => {}
        }
    }
}

fn snapshot_message(resolution: &WorkspaceResolution) -> String {
    if resolution.failure_message.is_empty() {
        format!("Workspace resolution {}", resolution.state)
    } else {
        format!("Workspace resolution {}: {}", resolution.state, resolution.failure_message)
    }
}

fn cancelled(batch_spec_id: &str, attempts: u32, progress: &mut dyn ProgressReporter) -> BatchError {
    info!(batch_spec_id, attempts, "workspace resolution polling cancelled");
    progress.complete("Stopped waiting; execution continues on the server");
    BatchError::Cancelled {
        batch_spec_id: Some(batch_spec_id.to_string()),
    }
}

fn failed(error: BatchError, attempts: u32, progress: &mut dyn ProgressReporter) -> BatchError {
    warn!(attempts, error = %error, "workspace resolution polling failed");
    progress.complete(&error.to_string());
    error
}
