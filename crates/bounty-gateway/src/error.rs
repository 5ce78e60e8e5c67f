//! Error types for route resolution and the HTTP gateway.
//!
//! [`ResolveError`] is what the resolver hands back to its caller. Not-found
//! is deliberately absent: it is a valid classification, not a failure.
//! [`ApiError`] is the HTTP-facing wrapper that maps those outcomes onto
//! status codes and a small JSON body.

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::graph::GraphError;

/// Failures surfaced by the resolver and the project listing.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The logical path (or another argument) was rejected before any query.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The content graph could not answer: transport failure, non-success
    /// status, GraphQL errors or an unparseable payload.
    #[error("resolution failed: {0}")]
    Resolution(#[from] GraphError),

    /// An internal route returned an entity whose `__typename` has no variant.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),
}

impl ResolveError {
    /// Shorthand for a malformed-payload resolution failure.
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::Resolution(GraphError::Decode(msg.into()))
    }
}

/// HTTP error type for the gateway routes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No route matched the requested path.
    #[error("not found: {0}")]
    NotFound(String),

    /// Resolution or listing failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Anything else (serialization, header construction).
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Map an extractor rejection: client mistakes become `InvalidInput`,
    /// anything else is internal.
    fn from_rejection(status: StatusCode, text: String) -> Self {
        if status.is_client_error() {
            Self::Resolve(ResolveError::InvalidInput(text))
        } else {
            Self::Internal(anyhow::anyhow!(text))
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

/// JSON error response body.
#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ApiError {
    /// Status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Resolve(ResolveError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Resolve(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message) = match &self {
            Self::NotFound(path) => ("not_found", Some(format!("no content at {path}"))),
            Self::Resolve(ResolveError::InvalidInput(msg)) => ("bad_request", Some(msg.clone())),
            Self::Resolve(ResolveError::UnknownEntityType(kind)) => {
                tracing::error!(entity_type = %kind, "unrenderable entity type");
                (
                    "unknown_entity_type",
                    Some("The requested content has an unsupported type".to_string()),
                )
            }
            Self::Resolve(ResolveError::Resolution(err)) => {
                tracing::error!(error = %err, "content graph error");
                (
                    "resolution_error",
                    Some("The content service is temporarily unavailable".to_string()),
                )
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    "internal_error",
                    Some("An internal error occurred".to_string()),
                )
            }
        };

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}
