//! Core executor data types.

use std::fmt;

use serde::{Deserialize, Serialize};
use srcbatch_types::{BatchChange, WorkspaceResolution};

/// Phases of a remote execution run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStage {
    UpsertingBatchChange,
    SubmittingBatchSpec,
    TriggeringExecution,
    ResolvingWorkspaces,
}

impl ExecutionStage {
    /// Human readable description used in progress messages.
    pub fn describe(self) -> &'static str {
        match self {
            Self::UpsertingBatchChange => "Upserting batch change",
            Self::SubmittingBatchSpec => "Creating batch spec",
            Self::TriggeringExecution => "Executing batch spec",
            Self::ResolvingWorkspaces => "Resolving workspaces",
        }
    }
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub batch_change: BatchChange,
    pub batch_spec_id: String,
    pub execution_id: String,
    /// Terminal success snapshot that ended polling.
    pub resolution: WorkspaceResolution,
    /// Number of resolution polls issued (>= 1).
    pub attempts: u32,
}
