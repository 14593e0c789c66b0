//! # srcbatch engine
//!
//! Executes batch specs on a Sourcegraph instance instead of locally.
//!
//! ## Key Features
//!
//! - **Typed operations**: upsert a batch change, submit a raw batch spec,
//!   trigger execution, and read workspace resolution ([`BatchesService`])
//! - **Capability detection**: instances without server-side batch changes
//!   yield [`BatchError::ExecutionUnsupported`] from any operation
//! - **Bounded polling**: workspace resolution is polled under a
//!   [`PollPolicy`] with a deadline, an optional attempt cap, and cancellation
//! - **Progress**: every phase is reported through a [`ProgressReporter`]
//!
//! ## Usage
//!
//! ```ignore
//! use srcbatch_api::SourcegraphClient;
//! use srcbatch_engine::{BatchesService, PollPolicy, RemoteExecutor, StatusBar};
//! use srcbatch_types::{BatchSpecFlags, RemoteExecutionRequest};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = SourcegraphClient::new_from_env()?;
//! let executor = RemoteExecutor::new(BatchesService::new(client), PollPolicy::default());
//! let request = RemoteExecutionRequest {
//!     batch_change_name: "hello-world".into(),
//!     namespace_id: "VXNlcjox".into(),
//!     raw_spec: std::fs::read_to_string("batch.yaml")?,
//!     flags: BatchSpecFlags::default(),
//! };
//! let report = executor
//!     .run(&request, &mut StatusBar::default(), &CancellationToken::new())
//!     .await?;
//! println!("batch spec {} resolved", report.batch_spec_id);
//! ```
//!
//! ## Architecture
//!
//! - **`service`**: GraphQL documents and the typed operation client
//! - **`guard`**: maps unsupported-feature errors to the sentinel
//! - **`executor`**: the four-step orchestrator and the resolution poller
//! - **`progress`**: the progress reporting seam and [`StatusBar`]
//! - **`error`**: [`BatchError`]

pub mod error;
pub mod executor;
pub mod guard;
pub mod progress;
pub mod service;

#[cfg(test)]
mod test_support;

pub use error::BatchError;
pub use executor::{ExecutionReport, ExecutionStage, PollPolicy, RemoteExecutor, ResolutionOutcome, TerminalStates};
pub use guard::{CapabilityGuard, UNSUPPORTED_ERROR_CODE};
pub use progress::{ProgressReporter, StatusBar};
pub use service::BatchesService;
