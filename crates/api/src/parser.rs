//! GraphQL response envelope decoding.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use srcbatch_util::redact_sensitive;

use crate::transport::{GraphQlError, TransportError};

/// Longest response body preview carried in an error.
const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

/// Decode a GraphQL HTTP response into its `data` payload.
///
/// - Non-empty `errors` always wins, even alongside partial data or a
///   non-success status, so callers can classify structured failures.
/// - Non-success status without an envelope maps to [`TransportError::Status`].
/// - `data` absent or `null` maps to `Ok(None)`.
pub fn decode_graphql_response(status: StatusCode, body: &str) -> Result<Option<Value>, TransportError> {
    let envelope = serde_json::from_str::<Envelope>(body);

    if let Ok(Envelope { errors: Some(errors), .. }) = &envelope
        && !errors.is_empty()
    {
        return Err(TransportError::GraphQl(errors.clone()));
    }

    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: body_preview(body),
        });
    }

    if body.trim().is_empty() {
        return Err(TransportError::Decode("empty response body".into()));
    }

    match envelope {
        Ok(Envelope { data: None | Some(Value::Null), .. }) => Ok(None),
        Ok(Envelope { data: Some(data), .. }) => Ok(Some(data)),
        Err(error) => Err(TransportError::Decode(format!(
            "{} (HTTP {}): {}",
            error,
            status.as_u16(),
            body_preview(body)
        ))),
    }
}

fn body_preview(body: &str) -> String {
    let redacted = redact_sensitive(body.trim());
    if redacted.chars().count() <= BODY_PREVIEW_LIMIT {
        return redacted;
    }
    let truncated: String = redacted.chars().take(BODY_PREVIEW_LIMIT.saturating_sub(3)).collect();
    format!("{}...", truncated.trim_end())
}
