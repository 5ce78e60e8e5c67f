//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::graph::{ContentGraph, HttpContentGraph};

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Content graph every lookup goes through.
    pub graph: Arc<dyn ContentGraph>,

    /// Application configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create application state backed by the HTTP content graph.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let graph = HttpContentGraph::from_config(&config)?;

        tracing::info!(
            endpoint = %config.graphql_uri,
            timeout_secs = config.query_timeout.as_secs(),
            "application state initialized"
        );

        Ok(Self::with_graph(config, Arc::new(graph)))
    }

    /// Create application state around an existing content graph.
    pub fn with_graph(config: Config, graph: Arc<dyn ContentGraph>) -> Self {
        Self {
            graph,
            config: Arc::new(config),
        }
    }
}
