//! Bounty Gateway - path resolution for a headless CMS.
//!
//! Resolves a logical path, optionally with a preview access token, into a
//! typed [`RouteQueryResult`] using a single query against the CMS content
//! graph. Also serves a cursor-paginated project listing.
//!
//! # Architecture
//!
//! - **Path**: Validates and normalizes URL segments into a [`LogicalPath`]
//! - **Graph**: The [`ContentGraph`] seam plus an HTTP client with OAuth
//!   client-credentials
//! - **Resolve**: Classifies the route as an internal entity, a redirect or
//!   not-found
//! - **Routes**: axum handlers mapping outcomes onto 200, 30x and 404
//!
//! # URL Pattern
//!
//! ```text
//! GET /{*path}?token=...      entity JSON, redirect or 404
//! GET /api/route?path=...     RouteQueryResult as JSON
//! GET /api/projects?after=... project cards
//! ```
//!
//! Results are never cached. Preview visibility depends on the token, so
//! every request is a fresh lookup.

pub mod auth;
pub mod config;
pub mod entity;
pub mod error;
pub mod graph;
pub mod path;
pub mod projects;
pub mod query;
pub mod resolve;
pub mod routes;
pub mod shutdown;
pub mod state;

pub use config::Config;
pub use entity::Entity;
pub use error::{ApiError, ResolveError};
pub use graph::{ContentGraph, HttpContentGraph};
pub use path::LogicalPath;
pub use resolve::{RouteKind, RouteQueryResult, resolve_route};
pub use routes::router;
pub use state::AppState;
