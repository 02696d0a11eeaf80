//! Core traits for knowledge-graph access.
//!
//! This module defines the trait hierarchy that backends must implement:
//!
//! - [`SparqlExecutor`] - SELECT and ASK queries against the triple store
//! - [`EntitySearcher`] - Ranked name/label search over entities
//! - [`ContentFetcher`] - Article text for a resolved entity
//! - [`KnowledgeGraph`] - Everything above, usable as a trait object

use async_trait::async_trait;

use crate::error::AppError;
use crate::graph::query::Params;
use crate::graph::row::RowStream;
use crate::models::Candidate;

/// Executes SPARQL queries against a triple store.
#[async_trait]
pub trait SparqlExecutor: Send + Sync {
    /// Executes a SELECT query and returns a stream of result rows.
    ///
    /// # Arguments
    ///
    /// * `sparql` - The query text, with `$name` placeholders
    /// * `params` - Terms bound to the placeholders
    async fn execute_sparql(&self, sparql: &str, params: Params)
        -> Result<RowStream<'_>, AppError>;

    /// Executes an ASK query and returns its boolean answer.
    async fn ask_sparql(&self, sparql: &str, params: Params) -> Result<bool, AppError>;
}

/// Ranked text search over entity labels and aliases.
///
/// The returned order is the upstream relevance order; callers must keep it.
#[async_trait]
pub trait EntitySearcher: Send + Sync {
    /// Returns at most `limit` candidates whose label or alias matches `text`.
    async fn search_entities(&self, text: &str, limit: usize) -> Result<Vec<Candidate>, AppError>;
}

/// Fetches summary text describing an entity.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Returns the plain-text introduction of an article, given its title or
    /// full URL, or `None` if the article has no extract.
    async fn fetch_extract(&self, title_or_url: &str) -> Result<Option<String>, AppError>;
}

/// A complete knowledge-graph backend.
///
/// Implemented automatically for every type providing all three
/// capabilities.
pub trait KnowledgeGraph: SparqlExecutor + EntitySearcher + ContentFetcher {}

impl<T: SparqlExecutor + EntitySearcher + ContentFetcher> KnowledgeGraph for T {}
