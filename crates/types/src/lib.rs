//! Shared data model for server-side batch change execution.
//!
//! These types are exchanged between the operation client, the execution
//! orchestrator, and the CLI. Identifiers are opaque strings minted by the
//! remote instance; the client never interprets them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A batch change as returned by `upsertEmptyBatchChange`.
///
/// The remote owns the record; callers only keep this read-only copy for the
/// duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchChange {
    /// Opaque GraphQL node identifier.
    pub id: String,
    /// Name of the batch change within its namespace.
    pub name: String,
}

/// Submission policy flags attached to a raw batch spec.
///
/// Flags are fixed at submission time. Submitting the same text with different
/// flags produces a new batch spec rather than mutating an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSpecFlags {
    /// Include repositories matched by a `.batchignore` file.
    pub allow_ignored: bool,
    /// Include repositories on unsupported code hosts.
    pub allow_unsupported: bool,
    /// Bypass the remote step cache.
    pub no_cache: bool,
}

/// Complete parameter surface of a remote execution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteExecutionRequest {
    /// Name of the batch change to create or reuse.
    pub batch_change_name: String,
    /// GraphQL ID of the user or organization namespace.
    pub namespace_id: String,
    /// Raw batch spec text, submitted verbatim.
    pub raw_spec: String,
    #[serde(default)]
    pub flags: BatchSpecFlags,
}

/// Point-in-time snapshot of a batch spec's workspace resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceResolution {
    pub state: ResolutionState,
    /// Populated only in failure-adjacent states; empty otherwise.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub failure_message: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Remote workspace resolution state.
///
/// The remote may add labels over time; anything not known here is kept
/// verbatim (upper-cased) in [`ResolutionState::Other`] so classification stays
/// forward compatible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResolutionState {
    Queued,
    Processing,
    Completed,
    Failed,
    Errored,
    Canceled,
    Other(String),
}

impl ResolutionState {
    /// Parse a remote label. Matching ignores case and treats `-`, `_`, and
    /// spaces alike, so `in-progress` and `IN_PROGRESS` are the same label.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .chars()
            .map(|character| match character {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        match normalized.as_str() {
            "QUEUED" => Self::Queued,
            "PROCESSING" | "IN_PROGRESS" => Self::Processing,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "ERRORED" => Self::Errored,
            "CANCELED" | "CANCELLED" => Self::Canceled,
            _ => Self::Other(normalized),
        }
    }

    /// Canonical upper-case label as the remote spells it.
    pub fn as_label(&self) -> &str {
        match self {
            Self::Queued => "QUEUED",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Errored => "ERRORED",
            Self::Canceled => "CANCELED",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for ResolutionState {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<&str> for ResolutionState {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl From<ResolutionState> for String {
    fn from(state: ResolutionState) -> Self {
        state.as_label().to_string()
    }
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
