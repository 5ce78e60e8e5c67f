//! Cursor-paginated project listing.
//!
//! Backs the "load more" project grid: each page is a `nodeProjects`
//! connection slice flattened into display cards.

use serde::{Deserialize, Serialize};

use crate::entity::{Category, Image, TextBody};
use crate::error::ResolveError;
use crate::graph::ContentGraph;
use crate::query;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Shown when a project has no default image.
const PLACEHOLDER_IMAGE: &str = "/image-placeholder.webp";

/// Shown when a project has no category.
const UNCATEGORIZED: &str = "Uncategorized";

/// One project card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub link: String,
    pub category: String,
}

/// Connection paging state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// A page of project cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPage {
    pub cards: Vec<ProjectCard>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectsData {
    node_projects: Option<ProjectConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectConnection {
    #[serde(default)]
    edges: Vec<ProjectEdge>,
    #[serde(default)]
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct ProjectEdge {
    node: ProjectNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectNode {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    body: Option<TextBody>,
    #[serde(default)]
    category: Option<Category>,
    #[serde(default)]
    default_image: Option<Image>,
}

impl From<ProjectNode> for ProjectCard {
    fn from(node: ProjectNode) -> Self {
        Self {
            title: node.title.unwrap_or_default(),
            description: node.body.and_then(|b| b.summary).unwrap_or_default(),
            image: node
                .default_image
                .and_then(|i| i.url)
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            link: node.path.unwrap_or_default(),
            category: node
                .category
                .and_then(|c| c.name)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            id: node.id,
        }
    }
}

/// Fetch one page of projects after an optional cursor.
pub async fn list_projects(
    graph: &dyn ContentGraph,
    first: u32,
    after: Option<&str>,
) -> Result<ProjectPage, ResolveError> {
    if first == 0 || first > MAX_PAGE_SIZE {
        return Err(ResolveError::InvalidInput(format!(
            "page size must be between 1 and {MAX_PAGE_SIZE}, got {first}"
        )));
    }

    let request = query::projects_request(first, after);
    let data = graph.execute(&request).await?.into_data()?;

    let parsed: ProjectsData = serde_json::from_value(data)
        .map_err(|e| ResolveError::malformed(format!("project listing: {e}")))?;
    let connection = parsed
        .node_projects
        .ok_or_else(|| ResolveError::malformed("response has no nodeProjects"))?;

    let cards: Vec<ProjectCard> = connection
        .edges
        .into_iter()
        .map(|edge| edge.node.into())
        .collect();

    tracing::debug!(
        count = cards.len(),
        has_next_page = connection.page_info.has_next_page,
        "project page fetched"
    );

    Ok(ProjectPage {
        cards,
        page_info: connection.page_info,
    })
}
