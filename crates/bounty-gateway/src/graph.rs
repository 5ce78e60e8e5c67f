//! Content graph client.
//!
//! The resolver depends only on [`ContentGraph`]: "execute one GraphQL
//! request and hand back the envelope". [`HttpContentGraph`] is the
//! production implementation, POSTing to the CMS GraphQL endpoint over a
//! shared `reqwest` connection pool.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, ClientCredentials};
use crate::config::Config;

/// Error bodies are kept for diagnostics but never in full.
const MAX_ERROR_BODY_LEN: usize = 512;

/// Failures talking to the content graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Connection, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status.
    #[error("content graph returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// The payload was not the shape we asked for.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The GraphQL layer reported errors for the query.
    #[error("query error: {0}")]
    Query(String),

    /// The server-side access token could not be obtained.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
}

/// A single GraphQL operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    /// Operation name, also used as a log field.
    pub operation_name: &'static str,
    /// Query document.
    pub query: &'static str,
    /// Query variables.
    pub variables: serde_json::Value,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorEntry {
    /// Human-readable message.
    pub message: String,
}

/// The GraphQL response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlResponse {
    /// Result data, absent when the whole operation failed.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Errors reported by the server.
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

impl GraphQlResponse {
    /// Envelope carrying only data.
    pub fn from_data(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// Unwrap the data, treating any reported error as a failure.
    ///
    /// Partial results are not trusted: a GraphQL error anywhere in the
    /// operation fails the whole query.
    pub fn into_data(self) -> Result<serde_json::Value, GraphError> {
        if !self.errors.is_empty() {
            let messages: Vec<_> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(GraphError::Query(messages.join("; ")));
        }
        match self.data {
            Some(serde_json::Value::Null) | None => {
                Err(GraphError::Decode("response has no data".to_string()))
            }
            Some(data) => Ok(data),
        }
    }
}

/// Something that can execute GraphQL queries against the CMS.
#[async_trait]
pub trait ContentGraph: Send + Sync {
    /// Execute one request. Implementations must not retry.
    async fn execute(&self, request: &GraphQlRequest) -> Result<GraphQlResponse, GraphError>;
}

/// HTTP implementation of [`ContentGraph`].
#[derive(Debug)]
pub struct HttpContentGraph {
    http: reqwest::Client,
    endpoint: String,
    credentials: Option<ClientCredentials>,
}

impl HttpContentGraph {
    /// Create a client for `endpoint`. Without credentials, queries are anonymous.
    pub fn new(
        endpoint: &str,
        credentials: Option<ClientCredentials>,
        timeout: Duration,
    ) -> Result<Self, GraphError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            credentials,
        })
    }

    /// Build the client described by the gateway configuration.
    pub fn from_config(config: &Config) -> Result<Self, GraphError> {
        let credentials = config
            .credentials()
            .map(|(id, secret)| ClientCredentials::new(&config.auth_uri, id, secret));
        Self::new(&config.graphql_uri, credentials, config.query_timeout)
    }
}

#[async_trait]
impl ContentGraph for HttpContentGraph {
    async fn execute(&self, request: &GraphQlRequest) -> Result<GraphQlResponse, GraphError> {
        let mut builder = self.http.post(&self.endpoint).json(request);
        if let Some(credentials) = &self.credentials {
            let header = credentials.authorization(&self.http).await?;
            builder = builder.header(AUTHORIZATION, header);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            if matches!(status.as_u16(), 401 | 403)
                && let Some(credentials) = &self.credentials
            {
                tracing::warn!(
                    status = status.as_u16(),
                    "content graph rejected access token"
                );
                credentials.invalidate().await;
            }
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::Status {
                status: status.as_u16(),
                body: truncate_body(body),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GraphError::Decode(e.to_string()))
    }
}

/// Cap an error body at [`MAX_ERROR_BODY_LEN`] bytes on a char boundary.
pub(crate) fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY_LEN {
        let mut end = MAX_ERROR_BODY_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}
