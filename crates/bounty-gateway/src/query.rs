//! GraphQL documents and request builders for the content graph.
//!
//! Route resolution is a single round trip: one `route(path:)` query that
//! selects both the internal-entity union (with per-type field sets) and the
//! redirect fields. `__typename` is requested at every level the resolver
//! discriminates on, including for entity types it does not know, so an
//! unhandled content type comes back tagged rather than as an empty object.

use crate::graph::GraphQlRequest;
use crate::path::LogicalPath;

/// Shared metatag selection for articles and pages.
macro_rules! metatag_fields {
    () => {
        r#"
        metatag {
          __typename
          ... on MetaTagLink { attributes { rel href } }
          ... on MetaTagValue { attributes { name content } }
          ... on MetaTagProperty { attributes { property content } }
        }"#
    };
}

/// Resolve a path to an internal entity or a redirect.
pub const ROUTE_QUERY: &str = concat!(
    r#"query ResolveRoute($path: String!, $token: String) {
  route(path: $path, token: $token) {
    __typename
    ... on RouteInternal {
      entity {
        __typename
        ... on NodeArticle {
          id
          title
          path"#,
    metatag_fields!(),
    r#"
        }
        ... on NodePage {
          id
          title
          path
          body { value summary }"#,
    metatag_fields!(),
    r#"
        }
        ... on NodeProject {
          id
          title
          path
          durations
          reward
          body { value summary }
          category { ... on TermCategory { id name } }
          defaultImage { url title alt }
          teams {
            ... on TermProjectTeam {
              id
              name
              teamMembers { id name mail }
            }
          }
        }
      }
    }
    ... on RouteRedirect {
      url
      status
    }
  }
}"#
);

/// Cursor-paginated project listing.
pub const PROJECTS_QUERY: &str = r#"query ListProjects($first: Int, $after: Cursor) {
  nodeProjects(first: $first, after: $after) {
    edges {
      node {
        id
        title
        path
        durations
        body { summary value }
        category { ... on TermCategory { id name } }
        defaultImage { url title alt }
      }
      cursor
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}"#;

/// Build the route resolution request.
///
/// The access token is a query variable and is omitted entirely when absent
/// or blank, so public and preview lookups are distinguishable upstream.
pub fn route_request(path: &LogicalPath, token: Option<&str>) -> GraphQlRequest {
    let mut variables = serde_json::Map::new();
    variables.insert("path".to_string(), path.as_str().into());
    if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
        variables.insert("token".to_string(), token.into());
    }

    GraphQlRequest {
        operation_name: "ResolveRoute",
        query: ROUTE_QUERY,
        variables: serde_json::Value::Object(variables),
    }
}

/// Build a project listing request.
pub fn projects_request(first: u32, after: Option<&str>) -> GraphQlRequest {
    GraphQlRequest {
        operation_name: "ListProjects",
        query: PROJECTS_QUERY,
        variables: serde_json::json!({
            "first": first,
            "after": after.filter(|c| !c.is_empty()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_query_selects_both_variants() {
        assert!(ROUTE_QUERY.contains("... on RouteInternal"));
        assert!(ROUTE_QUERY.contains("... on RouteRedirect"));
        assert!(ROUTE_QUERY.contains("... on NodeArticle"));
        assert!(ROUTE_QUERY.contains("... on NodePage"));
        assert!(ROUTE_QUERY.contains("... on NodeProject"));
        assert!(ROUTE_QUERY.contains("MetaTagProperty"));
    }

    #[test]
    fn route_request_without_token() {
        let path = LogicalPath::parse("/about").unwrap();
        let request = route_request(&path, None);
        assert_eq!(request.operation_name, "ResolveRoute");
        assert_eq!(request.variables, serde_json::json!({ "path": "/about" }));
    }

    #[test]
    fn route_request_token_is_a_variable_not_part_of_path() {
        let path = LogicalPath::parse("/about").unwrap();
        let request = route_request(&path, Some("preview-123"));
        assert_eq!(request.variables["path"], "/about");
        assert_eq!(request.variables["token"], "preview-123");
    }

    #[test]
    fn route_request_blank_token_is_omitted() {
        let path = LogicalPath::parse("/about").unwrap();
        let request = route_request(&path, Some("  "));
        assert!(request.variables.get("token").is_none());
    }

    #[test]
    fn projects_request_variables() {
        let request = projects_request(8, Some("cursor-1"));
        assert_eq!(request.variables["first"], 8);
        assert_eq!(request.variables["after"], "cursor-1");

        let first_page = projects_request(8, None);
        assert!(first_page.variables["after"].is_null());
    }
}
