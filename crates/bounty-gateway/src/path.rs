//! Logical path normalization.
//!
//! A logical path is the `/`-joined address handed to the content graph's
//! `route(path:)` query. It never carries query-time context such as an
//! access token.
//!
//! # Normalization Rules
//!
//! - Surrounding whitespace is trimmed
//! - A leading `/` is added if missing
//! - A trailing `/` is removed (except for the root itself)
//!
//! # Rejection Rules
//!
//! - Blank input
//! - `?` or `#` anywhere (query strings and fragments are not addresses)
//! - Empty interior segments (`/a//b`)

use std::fmt;

use serde::Serialize;

use crate::error::ResolveError;

/// A validated, normalized logical path. Always starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LogicalPath(String);

impl LogicalPath {
    /// The document root.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse and normalize a raw path string.
    ///
    /// ```
    /// use bounty_gateway::path::LogicalPath;
    ///
    /// assert_eq!(LogicalPath::parse("about/").unwrap().as_str(), "/about");
    /// assert!(LogicalPath::parse("  ").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let raw = raw.trim();

        if raw.is_empty() {
            return Err(ResolveError::InvalidInput("path is empty".to_string()));
        }
        if raw.contains(['?', '#']) {
            return Err(ResolveError::InvalidInput(format!(
                "path '{raw}' must not contain a query string or fragment"
            )));
        }
        if raw == "/" {
            return Ok(Self::root());
        }

        let body = raw.strip_prefix('/').unwrap_or(raw);
        let body = body.strip_suffix('/').unwrap_or(body);

        if body.split('/').any(|segment| segment.trim().is_empty()) {
            return Err(ResolveError::InvalidInput(format!(
                "path '{raw}' contains an empty segment"
            )));
        }

        Ok(Self(format!("/{body}")))
    }

    /// Join URL path segments into a logical path.
    ///
    /// An empty slice is the document root. Individual segments must be
    /// non-empty and must not contain `/` themselves.
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self, ResolveError> {
        if segments.is_empty() {
            return Ok(Self::root());
        }

        let mut joined = String::new();
        for segment in segments {
            let segment = segment.as_ref();
            if segment.trim().is_empty() || segment.contains('/') {
                return Err(ResolveError::InvalidInput(format!(
                    "invalid path segment '{segment}'"
                )));
            }
            joined.push('/');
            joined.push_str(segment);
        }

        Self::parse(&joined)
    }

    /// The normalized path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the document root.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
