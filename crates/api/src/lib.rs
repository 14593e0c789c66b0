//! Sourcegraph GraphQL client utilities.
//!
//! This crate provides the transport the batch change engine runs on:
//!
//! - [`OperationTransport`], the narrow "execute a named operation" seam
//! - [`SourcegraphClient`], a `reqwest`-backed implementation that posts
//!   GraphQL documents to `<endpoint>/.api/graphql`
//! - [`decode_graphql_response`], envelope decoding shared by all callers
//!
//! Credentials are discovered from `SRC_ACCESS_TOKEN` and the endpoint from
//! `SRC_ENDPOINT`.
//!
//! # Example
//!
//! ```ignore
//! use srcbatch_api::SourcegraphClient;
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let client = SourcegraphClient::new_from_env()?;
//!     println!("endpoint: {}", client.endpoint);
//!     Ok(())
//! }
//! ```

pub mod parser;
pub mod transport;

pub use parser::decode_graphql_response;
pub use transport::{GraphQlError, GraphQlErrorExtensions, Operation, OperationTransport, SchemaField, TransportError};

use std::env;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url, header};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Environment variable holding the instance URL.
pub const ENDPOINT_ENV: &str = "SRC_ENDPOINT";
/// Environment variable holding the access token.
pub const ACCESS_TOKEN_ENV: &str = "SRC_ACCESS_TOKEN";
/// Set to `1` or `true` to allow plain-http endpoints on non-local hosts.
pub const ALLOW_INSECURE_ENV: &str = "SRC_ALLOW_INSECURE";
/// Endpoint used when `SRC_ENDPOINT` is unset.
pub const DEFAULT_ENDPOINT: &str = "https://sourcegraph.com";

const GRAPHQL_PATH: &str = "/.api/graphql";
/// Hostnames allowed to use plain http regardless of configuration.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for Sourcegraph GraphQL access.
///
/// The client pre-configures the authorization and accept headers and posts
/// every operation to the instance's GraphQL endpoint.
pub struct SourcegraphClient {
    pub endpoint: String,
    pub http: Client,
    pub user_agent: String,
}

impl SourcegraphClient {
    /// Construct a [`SourcegraphClient`] from environment variables.
    ///
    /// - `SRC_ENDPOINT` selects the instance (default `https://sourcegraph.com`)
    /// - `SRC_ACCESS_TOKEN` supplies the token, if any
    /// - `SRC_ALLOW_INSECURE` permits http for non-local hosts
    pub fn new_from_env() -> Result<Self> {
        let endpoint = env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        let access_token = env::var(ACCESS_TOKEN_ENV).ok().filter(|token| !token.trim().is_empty());
        let allow_insecure = env::var(ALLOW_INSECURE_ENV)
            .map(|value| matches!(value.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);
        Self::new(&endpoint, access_token.as_deref(), allow_insecure)
    }

    /// Construct a client for an explicit endpoint and optional token.
    pub fn new(endpoint: &str, access_token: Option<&str>, allow_insecure: bool) -> Result<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/').to_string();
        validate_endpoint(&endpoint, allow_insecure)?;

        let mut default_headers = header::HeaderMap::new();
        if let Some(access_token) = access_token {
            let mut authorization = header::HeaderValue::from_str(&format!("token {}", access_token.trim()))
                .context("access token contains characters not allowed in a header")?;
            authorization.set_sensitive(true);
            default_headers.insert(header::AUTHORIZATION, authorization);
        }
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        Ok(Self {
            endpoint,
            http,
            user_agent: format!("srcbatch/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// GraphQL URL for an operation. The operation name is appended as a bare
    /// query string so server logs can attribute the request.
    pub fn graphql_url(&self, operation_name: &str) -> String {
        format!("{}{}?{}", self.endpoint, GRAPHQL_PATH, operation_name)
    }

    /// Build a POST request for the named operation.
    pub fn request(&self, operation_name: &str) -> RequestBuilder {
        let url = self.graphql_url(operation_name);
        debug!(%url, "building request");

        self.http.post(url).header(header::USER_AGENT, &self.user_agent)
    }
}

#[async_trait]
impl OperationTransport for SourcegraphClient {
    async fn execute(&self, operation: &Operation, variables: Value) -> Result<Option<Value>, TransportError> {
        let start = Instant::now();
        debug!(operation = operation.name, "graphql request started");

        let payload = json!({
            "query": operation.document,
            "variables": variables,
        });
        let response = self.request(operation.name).json(&payload).send().await.map_err(|error| {
            warn!(
                operation = operation.name,
                error = %error,
                duration_ms = start.elapsed().as_millis(),
                "graphql request failed"
            );
            TransportError::Network(error)
        })?;

        let status = response.status();
        let body = response.text().await?;
        let result = decode_graphql_response(status, &body);
        match &result {
            Ok(data) => debug!(
                operation = operation.name,
                status = %status,
                has_data = data.is_some(),
                duration_ms = start.elapsed().as_millis(),
                "graphql request completed"
            ),
            Err(error) => warn!(
                operation = operation.name,
                status = %status,
                error = %error,
                duration_ms = start.elapsed().as_millis(),
                "graphql request returned an error"
            ),
        }
        result
    }
}

/// Validate that an endpoint is acceptable for use by the client.
///
/// Rules:
/// - it must parse as an absolute URL with a host
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise the scheme must be https unless `allow_insecure` is set
fn validate_endpoint(endpoint: &str, allow_insecure: bool) -> Result<()> {
    let parsed = Url::parse(endpoint).map_err(|e| anyhow!("Invalid {} URL '{}': {}", ENDPOINT_ENV, endpoint, e))?;

    let host_name = parsed
        .host_str()
        .ok_or_else(|| anyhow!("{} must include a host", ENDPOINT_ENV))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!("{} must use http or https; got '{}://'", ENDPOINT_ENV, parsed.scheme()));
    }

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed.scheme() != "https" && !allow_insecure {
        return Err(anyhow!(
            "{} must use https for non-localhost hosts; got '{}://' (set {}=1 to override)",
            ENDPOINT_ENV,
            parsed.scheme(),
            ALLOW_INSECURE_ENV
        ));
    }

    Ok(())
}
