//! Capability guard.
//!
//! Instances without server-side batch changes reject the execution
//! operations in one of two recognizable ways. The guard turns either into
//! [`BatchError::ExecutionUnsupported`] and passes every other failure through
//! untouched.

use srcbatch_api::{Operation, TransportError};
use tracing::warn;

use crate::error::BatchError;

/// `extensions.code` the instance attaches when the feature is disabled.
pub const UNSUPPORTED_ERROR_CODE: &str = "ErrServerSideBatchChangesUnsupported";

/// Classifies transport failures into the capability sentinel.
///
/// Recognized signatures, both exact:
/// - a GraphQL error whose `extensions.code` is one of the configured codes
/// - schema validation rejecting the operation's feature field, i.e. the
///   message `Cannot query field "<field>" on type "<Type>".`
///
/// The guard keeps no state between calls, so an instance upgraded mid-process
/// is picked up on the next call.
#[derive(Debug, Clone)]
pub struct CapabilityGuard {
    unsupported_codes: Vec<String>,
}

impl Default for CapabilityGuard {
    fn default() -> Self {
        Self {
            unsupported_codes: vec![UNSUPPORTED_ERROR_CODE.to_string()],
        }
    }
}

impl CapabilityGuard {
    /// Guard recognizing the default error code.
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard recognizing exactly the provided error codes.
    pub fn with_unsupported_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unsupported_codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `error`, raised by `operation`, means the feature is unavailable.
    pub fn is_unsupported(&self, operation: &Operation, error: &TransportError) -> bool {
        let missing_field_message = operation.feature_field.missing_field_message();
        error.graphql_errors().iter().any(|graphql_error| {
            graphql_error
                .code()
                .is_some_and(|code| self.unsupported_codes.iter().any(|known| known == code))
                || graphql_error.message == missing_field_message
        })
    }

    /// Convert a transport failure into the engine's error type.
    pub fn classify(&self, operation: &Operation, error: TransportError) -> BatchError {
        if self.is_unsupported(operation, &error) {
            warn!(operation = operation.name, error = %error, "server side batch changes unsupported");
            return BatchError::ExecutionUnsupported;
        }
        BatchError::Transport(error)
    }

    /// Apply [`CapabilityGuard::classify`] to the error side of a result.
    pub fn check<T>(&self, operation: &Operation, result: Result<T, TransportError>) -> Result<T, BatchError> {
        result.map_err(|error| self.classify(operation, error))
    }
}
