//! Path-to-content resolution.
//!
//! Turns a logical path (plus an optional preview token) into a
//! [`RouteQueryResult`] with one query against the content graph. The result
//! is data: redirects are returned, never followed, and not-found is a
//! classification rather than an error. What to do with each outcome (render,
//! redirect, 404) is up to the caller.
//!
//! Nothing is cached here. Preview visibility differs per token, so two
//! calls for the same path are always two queries.

use serde::{Serialize, Serializer};

use crate::entity::Entity;
use crate::error::ResolveError;
use crate::graph::ContentGraph;
use crate::path::LogicalPath;
use crate::query;

/// Classification of a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteKind {
    Internal,
    Redirect,
    NotFound,
}

/// Whether a redirect is permanent (301/308) or temporary (302/303/307).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectClass {
    Permanent,
    Temporary,
}

impl RedirectClass {
    /// Classify an HTTP redirect status. Non-redirect codes yield `None`.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            301 | 308 => Some(Self::Permanent),
            302 | 303 | 307 => Some(Self::Temporary),
            _ => None,
        }
    }
}

/// Where a redirect route points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectTarget {
    /// Destination URL, relative or absolute, exactly as the CMS returned it.
    pub url: String,
    /// HTTP status the CMS configured for this redirect.
    pub status: u16,
    /// Permanent or temporary.
    pub class: RedirectClass,
}

/// What a path resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// The path is a content entity.
    Internal(Entity),
    /// The path is a redirect.
    Redirect(RedirectTarget),
    /// No route matched.
    NotFound,
}

/// Result of resolving one logical path.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQueryResult {
    /// The normalized path that was queried.
    pub path: LogicalPath,
    /// The classified outcome.
    pub outcome: RouteOutcome,
}

impl RouteOutcome {
    /// Classification of this outcome.
    pub fn kind(&self) -> RouteKind {
        match self {
            Self::Internal(_) => RouteKind::Internal,
            Self::Redirect(_) => RouteKind::Redirect,
            Self::NotFound => RouteKind::NotFound,
        }
    }
}

impl RouteQueryResult {
    /// The outcome's classification.
    pub fn kind(&self) -> RouteKind {
        self.outcome.kind()
    }

    /// The entity, present iff the kind is `Internal`.
    pub fn entity(&self) -> Option<&Entity> {
        match &self.outcome {
            RouteOutcome::Internal(entity) => Some(entity),
            _ => None,
        }
    }

    /// The redirect target, present iff the kind is `Redirect`.
    pub fn redirect_target(&self) -> Option<&RedirectTarget> {
        match &self.outcome {
            RouteOutcome::Redirect(target) => Some(target),
            _ => None,
        }
    }
}

/// Flattened wire view: `{ path, kind, entity?, redirectTarget? }`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteQueryView<'a> {
    path: &'a LogicalPath,
    kind: RouteKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity: Option<&'a Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_target: Option<&'a RedirectTarget>,
}

impl Serialize for RouteQueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RouteQueryView {
            path: &self.path,
            kind: self.kind(),
            entity: self.entity(),
            redirect_target: self.redirect_target(),
        }
        .serialize(serializer)
    }
}

/// Resolve a raw logical path.
///
/// An empty or malformed path fails with [`ResolveError::InvalidInput`]
/// before any query is issued.
pub async fn resolve_route(
    graph: &dyn ContentGraph,
    logical_path: &str,
    access_token: Option<&str>,
) -> Result<RouteQueryResult, ResolveError> {
    let path = LogicalPath::parse(logical_path)?;
    resolve_path(graph, path, access_token).await
}

/// Resolve a path given as URL segments. No segments means the document root.
pub async fn resolve_segments<S: AsRef<str>>(
    graph: &dyn ContentGraph,
    segments: &[S],
    access_token: Option<&str>,
) -> Result<RouteQueryResult, ResolveError> {
    let path = LogicalPath::from_segments(segments)?;
    resolve_path(graph, path, access_token).await
}

/// Resolve an already-validated path with exactly one content graph query.
pub async fn resolve_path(
    graph: &dyn ContentGraph,
    path: LogicalPath,
    access_token: Option<&str>,
) -> Result<RouteQueryResult, ResolveError> {
    let request = query::route_request(&path, access_token);

    tracing::debug!(
        path = %path,
        preview = request.variables.get("token").is_some(),
        "resolving route"
    );

    let data = graph.execute(&request).await?.into_data()?;
    let outcome = classify(data)?;

    tracing::debug!(path = %path, kind = ?outcome.kind(), "route resolved");

    Ok(RouteQueryResult { path, outcome })
}

/// Classify the `data` object of a route query.
fn classify(mut data: serde_json::Value) -> Result<RouteOutcome, ResolveError> {
    let route = data
        .as_object_mut()
        .and_then(|obj| obj.remove("route"))
        .ok_or_else(|| ResolveError::malformed("response has no route field"))?;

    if route.is_null() {
        return Ok(RouteOutcome::NotFound);
    }

    let typename = route
        .get("__typename")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ResolveError::malformed("route has no __typename"))?;

    match typename {
        "RouteRedirect" => classify_redirect(&route).map(RouteOutcome::Redirect),
        "RouteInternal" => match route.get("entity") {
            // The route exists but the entity is unpublished or not visible
            // to this token.
            None | Some(serde_json::Value::Null) => Ok(RouteOutcome::NotFound),
            Some(entity) => Entity::from_graph(entity.clone()).map(RouteOutcome::Internal),
        },
        other => Err(ResolveError::malformed(format!(
            "unsupported route type '{other}'"
        ))),
    }
}

fn classify_redirect(route: &serde_json::Value) -> Result<RedirectTarget, ResolveError> {
    let url = route
        .get("url")
        .and_then(serde_json::Value::as_str)
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ResolveError::malformed("redirect has no url"))?;

    let status = route
        .get("status")
        .and_then(serde_json::Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .ok_or_else(|| ResolveError::malformed("redirect has no status"))?;

    let class = RedirectClass::from_status(status).ok_or_else(|| {
        ResolveError::malformed(format!("redirect status {status} is not a redirect code"))
    })?;

    Ok(RedirectTarget {
        url: url.to_string(),
        status,
        class,
    })
}
