//! Typed client for the four batch change execution operations.
//!
//! Each method issues one operation through the transport, routes failures
//! through the [`CapabilityGuard`], and decodes the payload into the shared
//! model. `Ok(None)` means the remote answered without an error but returned
//! no object.

pub mod queries;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use srcbatch_api::{Operation, OperationTransport, TransportError};
use srcbatch_types::{BatchChange, BatchSpecFlags, WorkspaceResolution};
use tracing::debug;

use crate::error::BatchError;
use crate::guard::CapabilityGuard;
use queries::{BATCH_SPEC_WORKSPACE_RESOLUTION, CREATE_BATCH_SPEC_FROM_RAW, EXECUTE_BATCH_SPEC, UPSERT_EMPTY_BATCH_CHANGE};

#[derive(Debug, Deserialize)]
struct NodeId {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertEmptyBatchChangeData {
    upsert_empty_batch_change: Option<BatchChange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBatchSpecFromRawData {
    create_batch_spec_from_raw: Option<NodeId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteBatchSpecData {
    execute_batch_spec: Option<NodeId>,
}

#[derive(Debug, Deserialize)]
struct WorkspaceResolutionData {
    node: Option<BatchSpecNode>,
}

/// `node` may resolve to any type; only a batch spec carries a resolution.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchSpecNode {
    #[serde(default)]
    workspace_resolution: Option<WorkspaceResolution>,
}

/// Batch change operations over an [`OperationTransport`].
pub struct BatchesService<T> {
    transport: T,
    guard: CapabilityGuard,
}

impl<T: OperationTransport> BatchesService<T> {
    /// Service using the default capability guard.
    pub fn new(transport: T) -> Self {
        Self::with_guard(transport, CapabilityGuard::default())
    }

    pub fn with_guard(transport: T, guard: CapabilityGuard) -> Self {
        Self { transport, guard }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Create the named batch change in the namespace, or return the existing
    /// one. Never fails because the batch change already exists.
    pub async fn upsert_batch_change(&self, name: &str, namespace_id: &str) -> Result<Option<BatchChange>, BatchError> {
        let variables = json!({
            "name": name,
            "namespace": namespace_id,
        });
        let data: Option<UpsertEmptyBatchChangeData> = self.run(&UPSERT_EMPTY_BATCH_CHANGE, variables).await?;
        Ok(data.and_then(|data| data.upsert_empty_batch_change))
    }

    /// Submit raw batch spec text bound to a batch change. Every call mints a
    /// new batch spec, even for identical input.
    pub async fn create_batch_spec_from_raw(
        &self,
        raw_spec: &str,
        namespace_id: &str,
        batch_change_id: &str,
        flags: BatchSpecFlags,
    ) -> Result<Option<String>, BatchError> {
        let variables = json!({
            "batchSpec": raw_spec,
            "namespace": namespace_id,
            "allowIgnored": flags.allow_ignored,
            "allowUnsupported": flags.allow_unsupported,
            "noCache": flags.no_cache,
            "batchChange": batch_change_id,
        });
        let data: Option<CreateBatchSpecFromRawData> = self.run(&CREATE_BATCH_SPEC_FROM_RAW, variables).await?;
        Ok(data.and_then(|data| data.create_batch_spec_from_raw).map(|node| node.id))
    }

    /// Trigger execution of a batch spec and return the identifier of the
    /// started execution.
    pub async fn execute_batch_spec(&self, batch_spec_id: &str, no_cache: bool) -> Result<Option<String>, BatchError> {
        let variables = json!({
            "batchSpec": batch_spec_id,
            "noCache": no_cache,
        });
        let data: Option<ExecuteBatchSpecData> = self.run(&EXECUTE_BATCH_SPEC, variables).await?;
        Ok(data.and_then(|data| data.execute_batch_spec).map(|node| node.id))
    }

    /// Current workspace resolution snapshot. `None` when the node is missing,
    /// is not a batch spec, or has no resolution yet.
    pub async fn workspace_resolution(&self, batch_spec_id: &str) -> Result<Option<WorkspaceResolution>, BatchError> {
        let variables = json!({ "batchSpec": batch_spec_id });
        let data: Option<WorkspaceResolutionData> = self.run(&BATCH_SPEC_WORKSPACE_RESOLUTION, variables).await?;
        Ok(data
            .and_then(|data| data.node)
            .and_then(|node| node.workspace_resolution))
    }

    async fn run<R: DeserializeOwned>(&self, operation: &Operation, variables: Value) -> Result<Option<R>, BatchError> {
        let data = self
            .guard
            .check(operation, self.transport.execute(operation, variables).await)?;
        let Some(data) = data else {
            debug!(operation = operation.name, "operation returned no data");
            return Ok(None);
        };
        serde_json::from_value(data).map(Some).map_err(|error| {
            BatchError::Transport(TransportError::Decode(format!(
                "unexpected {} payload: {}",
                operation.name, error
            )))
        })
    }
}
