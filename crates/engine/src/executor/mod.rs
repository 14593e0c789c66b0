//! Remote execution orchestrator.
//!
//! Runs the full sequence for one batch spec:
//!
//! 1. upsert the batch change by name within the namespace
//! 2. submit the raw spec bound to it (always minting a new batch spec)
//! 3. trigger execution of that batch spec
//! 4. poll workspace resolution until the [`PollPolicy`] says stop
//!
//! Steps run strictly in order and each consumes the previous step's
//! identifier. The first failure or a cancellation aborts the run; nothing is
//! rolled back on the instance.

pub mod policy;
mod poll;
pub mod types;

pub use policy::{PollPolicy, ResolutionOutcome, TerminalStates};
pub use types::{ExecutionReport, ExecutionStage};

use srcbatch_api::OperationTransport;
use srcbatch_types::RemoteExecutionRequest;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::BatchError;
use crate::progress::ProgressReporter;
use crate::service::BatchesService;
use poll::poll_workspace_resolution;

/// Label shown while the setup calls run.
const SETUP_LABEL: &str = "Sending batch spec";

/// Drives a [`RemoteExecutionRequest`] through the instance.
pub struct RemoteExecutor<T> {
    service: BatchesService<T>,
    policy: PollPolicy,
}

impl<T: OperationTransport> RemoteExecutor<T> {
    pub fn new(service: BatchesService<T>, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    pub fn service(&self) -> &BatchesService<T> {
        &self.service
    }

    /// Run the whole sequence and return the terminal success snapshot.
    ///
    /// `progress` sees one `reset → update* → complete` cycle for the setup
    /// calls and another for polling. `cancel` abandons whichever call is in
    /// flight and stops before the next one; work the instance already
    /// accepted is left alone.
    pub async fn run(
        &self,
        request: &RemoteExecutionRequest,
        progress: &mut dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ExecutionReport, BatchError> {
        info!(
            batch_change = %request.batch_change_name,
            namespace = %request.namespace_id,
            allow_ignored = request.flags.allow_ignored,
            allow_unsupported = request.flags.allow_unsupported,
            no_cache = request.flags.no_cache,
            "remote execution started"
        );
        progress.reset(SETUP_LABEL, ExecutionStage::UpsertingBatchChange.describe());

        let batch_change = until_cancelled(
            cancel,
            None,
            self.service
                .upsert_batch_change(&request.batch_change_name, &request.namespace_id),
        )
        .await
        .and_then(|found| {
            found.ok_or_else(|| BatchError::NotFound {
                what: "batch change",
                id: request.batch_change_name.clone(),
            })
        })
        .map_err(|error| abort(ExecutionStage::UpsertingBatchChange, error, progress))?;
        info!(batch_change_id = %batch_change.id, "batch change upserted");

        progress.update(ExecutionStage::SubmittingBatchSpec.describe());
        let batch_spec_id = until_cancelled(
            cancel,
            None,
            self.service
                .create_batch_spec_from_raw(&request.raw_spec, &request.namespace_id, &batch_change.id, request.flags),
        )
        .await
        .and_then(|found| {
            found.ok_or_else(|| BatchError::NotFound {
                what: "batch spec created for batch change",
                id: batch_change.id.clone(),
            })
        })
        .map_err(|error| abort(ExecutionStage::SubmittingBatchSpec, error, progress))?;
        info!(batch_spec_id = %batch_spec_id, "batch spec created");

        progress.update(ExecutionStage::TriggeringExecution.describe());
        let execution_id = until_cancelled(
            cancel,
            Some(batch_spec_id.as_str()),
            self.service.execute_batch_spec(&batch_spec_id, request.flags.no_cache),
        )
        .await
        .and_then(|found| {
            found.ok_or_else(|| BatchError::NotFound {
                what: "execution for batch spec",
                id: batch_spec_id.clone(),
            })
        })
        .map_err(|error| abort(ExecutionStage::TriggeringExecution, error, progress))?;
        info!(batch_spec_id = %batch_spec_id, execution_id = %execution_id, "batch spec execution started");
        progress.complete(&format!("Execution {execution_id} started"));

        let outcome = poll_workspace_resolution(&self.service, &batch_spec_id, &self.policy, progress, cancel).await?;

        info!(
            batch_change_id = %batch_change.id,
            batch_spec_id = %batch_spec_id,
            attempts = outcome.attempts,
            state = %outcome.resolution.state,
            "remote execution finished"
        );
        Ok(ExecutionReport {
            batch_change,
            batch_spec_id,
            execution_id,
            resolution: outcome.resolution,
            attempts: outcome.attempts,
        })
    }

    /// Poll an already-executing batch spec without the setup calls.
    pub async fn wait_for_resolution(
        &self,
        batch_spec_id: &str,
        progress: &mut dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<srcbatch_types::WorkspaceResolution, BatchError> {
        poll_workspace_resolution(&self.service, batch_spec_id, &self.policy, progress, cancel)
            .await
            .map(|outcome| outcome.resolution)
    }
}

/// Await a setup call unless `cancel` fires first.
async fn until_cancelled<F, T>(
    cancel: &CancellationToken,
    batch_spec_id: Option<&str>,
    call: F,
) -> Result<T, BatchError>
where
    F: Future<Output = Result<T, BatchError>>,
{
    let cancelled = || BatchError::Cancelled {
        batch_spec_id: batch_spec_id.map(str::to_string),
    };
    if cancel.is_cancelled() {
        return Err(cancelled());
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(cancelled()),
        result = call => result,
    }
}

fn abort(stage: ExecutionStage, error: BatchError, progress: &mut dyn ProgressReporter) -> BatchError {
    if matches!(error, BatchError::Cancelled { .. }) {
        info!(stage = %stage, "remote execution cancelled");
        progress.complete(&format!("Cancelled while {}", stage.describe().to_lowercase()));
    } else {
        warn!(stage = %stage, error = %error, "remote execution aborted");
        progress.complete(&format!("{stage} failed: {error}"));
    }
    error
}
