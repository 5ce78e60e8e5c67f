//! JSON API endpoints.
//!
//! - `GET /api/route?path=&token=` returns the [`RouteQueryResult`] itself,
//!   with 200 for every classification including not-found.
//! - `GET /api/projects?after=` returns one page of project cards.
//!
//! [`RouteQueryResult`]: crate::resolve::RouteQueryResult

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::ApiError;
use crate::projects;
use crate::resolve;
use crate::state::AppState;

/// Query parameters for route lookups.
#[derive(Debug, Default, Deserialize)]
pub struct RouteParams {
    #[serde(default)]
    pub path: String,
    pub token: Option<String>,
}

/// Query parameters for the project listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectsParams {
    pub after: Option<String>,
}

/// Resolve a path and return the classification as JSON.
pub async fn route_handler(
    State(state): State<AppState>,
    params: Result<Query<RouteParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let result =
        resolve::resolve_route(state.graph.as_ref(), &params.path, params.token.as_deref())
            .await?;

    let mut response = Json(result).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}

/// Fetch the next page of projects.
pub async fn projects_handler(
    State(state): State<AppState>,
    params: Result<Query<ProjectsParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let page = projects::list_projects(
        state.graph.as_ref(),
        state.config.projects_page_size,
        params.after.as_deref(),
    )
    .await?;

    Ok(Json(page).into_response())
}
