//! Route definitions for the gateway.
//!
//! ## Routes
//!
//! - `GET /health` - Health check (JSON)
//! - `GET /api/route` - Route classification (JSON)
//! - `GET /api/projects` - Project listing page (JSON)
//! - `GET /` - Document root
//! - `GET /{*path}` - Any content path (entity JSON, redirect or 404)
//!
//! The three gateway endpoints are matched before the catch-all, so a CMS
//! alias of exactly `/health`, `/api/route` or `/api/projects` is not served
//! by `/{*path}`. Query it through `/api/route?path=` instead. Other paths
//! under `/api/` still resolve as content.

mod api;
mod content;
mod health;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Build the complete gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/route", get(api::route_handler))
        .route("/api/projects", get(api::projects_handler))
        .route("/", get(content::root_handler))
        .route("/{*path}", get(content::content_handler))
        .with_state(state)
}
