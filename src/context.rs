//! Application context providing dependency injection root.

use std::sync::Arc;

use crate::config::Config;
use crate::di::Context as ContextDerive;
use crate::error::AppError;
use crate::graph::backends::wikidata::WikidataClient;
use crate::graph::KnowledgeGraph;

/// Shared handle to the knowledge-graph backend.
pub type AppGraph = Arc<dyn KnowledgeGraph>;

/// Root application context for dependency injection.
///
/// The Context holds all shared dependencies and uses `#[derive(Context)]`
/// to generate `FromRef` implementations for each field, enabling
/// compile-time dependency resolution.
#[derive(ContextDerive, Clone)]
pub struct Context {
    /// Knowledge-graph backend (search, SPARQL, article text).
    pub graph: AppGraph,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl Context {
    /// Creates a new context with the given dependencies.
    pub fn new(graph: AppGraph, config: Config) -> Self {
        Self {
            graph,
            config: Arc::new(config),
        }
    }

    /// Creates a context backed by the configured Wikidata endpoints.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let client = WikidataClient::new(&config.endpoint)?;
        tracing::debug!(?client, "Created Wikidata client");
        Ok(Self::new(Arc::new(client), config))
    }
}
