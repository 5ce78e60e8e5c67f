//! Content route handler.
//!
//! Handles `GET /` and `GET /{*path}`, turning a resolved route into the
//! response a site frontend expects: the entity as JSON, a redirect, or 404.

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::ApiError;
use crate::resolve::{self, RouteOutcome, RouteQueryResult};
use crate::state::AppState;

/// Optional preview token.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Handle the document root.
pub async fn root_handler(
    State(state): State<AppState>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let segments: [&str; 0] = [];
    let result =
        resolve::resolve_segments(state.graph.as_ref(), &segments, query.token.as_deref()).await?;
    respond(result, query.token.as_deref())
}

/// Handle any other content path.
pub async fn content_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Path(path) = path?;
    let Query(query) = query?;
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    let result =
        resolve::resolve_segments(state.graph.as_ref(), &segments, query.token.as_deref()).await?;
    respond(result, query.token.as_deref())
}

fn respond(result: RouteQueryResult, token: Option<&str>) -> Result<Response, ApiError> {
    let headers = cache_headers(token);

    match result.outcome {
        RouteOutcome::Internal(entity) => {
            tracing::debug!(
                path = %result.path,
                content_type = entity.content_type(),
                "serving entity"
            );
            Ok((StatusCode::OK, headers, Json(entity)).into_response())
        }
        RouteOutcome::Redirect(target) => {
            let status = StatusCode::from_u16(target.status)
                .map_err(|e| ApiError::Internal(anyhow::anyhow!("redirect status: {e}")))?;
            let location = HeaderValue::from_str(&target.url)
                .map_err(|e| ApiError::Internal(anyhow::anyhow!("redirect location: {e}")))?;

            tracing::debug!(
                path = %result.path,
                status = target.status,
                location = %target.url,
                "redirecting"
            );

            let mut headers = headers;
            headers.insert(header::LOCATION, location);
            Ok((status, headers).into_response())
        }
        RouteOutcome::NotFound => Err(ApiError::NotFound(result.path.to_string())),
    }
}

/// Preview responses are per-token and must never be shared by a cache.
fn cache_headers(token: Option<&str>) -> HeaderMap {
    let previewing = token.is_some_and(|t| !t.trim().is_empty());
    let value = if previewing {
        "private, no-store"
    } else {
        "public, max-age=60"
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(value));
    headers
}
