//! Test doubles shared by the engine's unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use srcbatch_api::{Operation, OperationTransport, TransportError};
use tokio_util::sync::CancellationToken;

use crate::progress::ProgressReporter;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub operation: &'static str,
    pub variables: Value,
}

/// Transport answering from a fixed script, in call order.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<Option<Value>, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    cancel_on_call: Option<(usize, CancellationToken)>,
    stall_on_call: Option<usize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, data: Value) -> Self {
        self.push(Ok(Some(data)))
    }

    pub fn respond_times(mut self, data: Value, times: usize) -> Self {
        for _ in 0..times {
            self = self.respond(data.clone());
        }
        self
    }

    /// Envelope with neither data nor errors.
    pub fn respond_empty(self) -> Self {
        self.push(Ok(None))
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.push(Err(error))
    }

    /// Cancel `token` while serving the call with this 1-based index.
    pub fn cancel_on_call(mut self, call: usize, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, token));
        self
    }

    /// Never answer the call with this 1-based index.
    pub fn stall_on_call(mut self, call: usize) -> Self {
        self.stall_on_call = Some(call);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &Operation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.operation == operation.name)
            .count()
    }

    fn push(self, entry: Result<Option<Value>, TransportError>) -> Self {
        self.script.lock().unwrap().push_back(entry);
        self
    }
}

#[async_trait]
impl OperationTransport for ScriptedTransport {
    async fn execute(&self, operation: &Operation, variables: Value) -> Result<Option<Value>, TransportError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                operation: operation.name,
                variables,
            });
            calls.len()
        };
        if let Some((trigger, token)) = &self.cancel_on_call
            && *trigger == call_number
        {
            token.cancel();
        }
        if self.stall_on_call == Some(call_number) {
            std::future::pending::<()>().await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Decode(format!("script exhausted at {}", operation.name))))
    }
}

/// Minimal in-memory instance with real upsert and mint semantics.
///
/// Batch changes are keyed by `(name, namespace)`; every spec submission and
/// execution gets a fresh id. Resolution states are served from a script and
/// the last one repeats.
pub(crate) struct FakeInstance {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    batch_changes: HashMap<(String, String), String>,
    specs: Vec<String>,
    executions: u32,
    resolution_states: VecDeque<&'static str>,
}

impl FakeInstance {
    pub fn resolving_to(states: &[&'static str]) -> Self {
        Self {
            state: Mutex::new(FakeState {
                resolution_states: states.iter().copied().collect(),
                ..Default::default()
            }),
        }
    }

    pub fn submitted_specs(&self) -> Vec<String> {
        self.state.lock().unwrap().specs.clone()
    }

    pub fn batch_change_count(&self) -> usize {
        self.state.lock().unwrap().batch_changes.len()
    }
}

#[async_trait]
impl OperationTransport for FakeInstance {
    async fn execute(&self, operation: &Operation, variables: Value) -> Result<Option<Value>, TransportError> {
        let mut state = self.state.lock().unwrap();
        let data = match operation.name {
            "UpsertEmptyBatchChange" => {
                let name = variables["name"].as_str().unwrap_or_default().to_string();
                let namespace = variables["namespace"].as_str().unwrap_or_default().to_string();
                let next_id = format!("BC{}", state.batch_changes.len() + 1);
                let id = state
                    .batch_changes
                    .entry((name.clone(), namespace))
                    .or_insert(next_id)
                    .clone();
                json!({ "upsertEmptyBatchChange": { "id": id, "name": name } })
            }
            "CreateBatchSpecFromRaw" => {
                state
                    .specs
                    .push(variables["batchSpec"].as_str().unwrap_or_default().to_string());
                json!({ "createBatchSpecFromRaw": { "id": format!("BS{}", state.specs.len()) } })
            }
            "ExecuteBatchSpec" => {
                state.executions += 1;
                json!({ "executeBatchSpec": { "id": format!("EX{}", state.executions) } })
            }
            "BatchSpecWorkspaceResolution" => {
                let label = if state.resolution_states.len() > 1 {
                    state.resolution_states.pop_front().unwrap_or("QUEUED")
                } else {
                    state.resolution_states.front().copied().unwrap_or("QUEUED")
                };
                json!({
                    "node": {
                        "__typename": "BatchSpec",
                        "workspaceResolution": { "state": label, "failureMessage": null }
                    }
                })
            }
            other => return Err(TransportError::Decode(format!("unknown operation {other}"))),
        };
        Ok(Some(data))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProgressEvent {
    Reset { label: String, message: String },
    Update(String),
    Complete(String),
}

/// Reporter that keeps every notification.
#[derive(Debug, Default)]
pub(crate) struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
}

impl RecordingProgress {
    /// Events since the most recent reset, the reset included.
    pub fn last_phase(&self) -> &[ProgressEvent] {
        let start = self
            .events
            .iter()
            .rposition(|event| matches!(event, ProgressEvent::Reset { .. }))
            .unwrap_or(0);
        &self.events[start..]
    }

    pub fn update_count(&self, phase: &[ProgressEvent]) -> usize {
        phase
            .iter()
            .filter(|event| matches!(event, ProgressEvent::Update(_)))
            .count()
    }
}

impl ProgressReporter for RecordingProgress {
    fn reset(&mut self, label: &str, message: &str) {
        self.events.push(ProgressEvent::Reset {
            label: label.to_string(),
            message: message.to_string(),
        });
    }

    fn update(&mut self, message: &str) {
        self.events.push(ProgressEvent::Update(message.to_string()));
    }

    fn complete(&mut self, message: &str) {
        self.events.push(ProgressEvent::Complete(message.to_string()));
    }
}
