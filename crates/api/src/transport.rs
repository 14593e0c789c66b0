//! Generic operation transport.
//!
//! The engine talks to the remote through [`OperationTransport`]: execute a
//! named GraphQL operation with JSON variables and hand back the raw `data`
//! payload. Decoding into typed results happens one layer up.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A `Type.field` coordinate in the remote GraphQL schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    pub type_name: &'static str,
    pub field_name: &'static str,
}

impl SchemaField {
    /// Message the server's schema validation emits when this field does not
    /// exist, e.g. `Cannot query field "executeBatchSpec" on type "Mutation".`
    pub fn missing_field_message(&self) -> String {
        format!("Cannot query field \"{}\" on type \"{}\".", self.field_name, self.type_name)
    }
}

/// A named GraphQL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Operation name as declared in the document, e.g. `ExecuteBatchSpec`.
    pub name: &'static str,
    /// Field that only exists on servers offering the feature this operation
    /// belongs to.
    pub feature_field: SchemaField,
    /// Full GraphQL document.
    pub document: &'static str,
}

/// A single entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub path: Vec<Value>,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

/// Structured metadata attached to a GraphQL error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQlErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

impl GraphQlError {
    /// Build an error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extensions: None,
        }
    }

    /// Build an error carrying a machine-readable `extensions.code`.
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extensions: Some(GraphQlErrorExtensions { code: Some(code.into()) }),
        }
    }

    /// The `extensions.code` value, if the remote supplied one.
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref().and_then(|extensions| extensions.code.as_deref())
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

/// Failure while executing an operation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The remote answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body was not a GraphQL envelope or did not match the
    /// expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
    /// The remote reported GraphQL errors.
    #[error("graphql: {}", join_errors(.0))]
    GraphQl(Vec<GraphQlError>),
}

impl TransportError {
    /// GraphQL errors carried by this failure; empty for other kinds.
    pub fn graphql_errors(&self) -> &[GraphQlError] {
        match self {
            Self::GraphQl(errors) => errors,
            _ => &[],
        }
    }
}

fn join_errors(errors: &[GraphQlError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Executes named operations against the remote instance.
///
/// Returns `Ok(Some(data))` when the remote answered with a populated `data`
/// object and `Ok(None)` when it answered successfully without data.
#[async_trait]
pub trait OperationTransport: Send + Sync {
    async fn execute(&self, operation: &Operation, variables: Value) -> Result<Option<Value>, TransportError>;
}

#[async_trait]
impl<T> OperationTransport for Arc<T>
where
    T: OperationTransport + ?Sized,
{
    async fn execute(&self, operation: &Operation, variables: Value) -> Result<Option<Value>, TransportError> {
        self.as_ref().execute(operation, variables).await
    }
}
