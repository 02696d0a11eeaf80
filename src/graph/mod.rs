//! Knowledge-graph abstraction layer for backend-agnostic access.
//!
//! This module provides a trait-based abstraction over the upstream
//! services the search engine talks to, so the same application code works
//! against the live Wikidata endpoints or an in-memory test backend.
//!
//! # Architecture
//!
//! - [`SparqlExecutor`] - Execute SELECT and ASK queries
//! - [`EntitySearcher`] - Ranked label/alias search
//! - [`ContentFetcher`] - Article text for an entity
//! - [`KnowledgeGraph`] - All of the above, held as `Arc<dyn KnowledgeGraph>`
//!
//! # Usage
//!
//! ```ignore
//! use cyberlex::graph::QueryExt;
//!
//! // Query with parameters
//! let rows = graph
//!     .query("SELECT ?type WHERE { $item wdt:P31 ?type }")
//!     .entity("item", &id)
//!     .fetch_all()
//!     .await?;
//!
//! // ASK query
//! let is_class = graph
//!     .query("ASK { ?x wdt:P279 $item }")
//!     .entity("item", &id)
//!     .ask()
//!     .await?;
//! ```

mod macros;
mod query;
mod row;
mod traits;

pub mod backends;

// Re-export core types
pub use query::{render, Params, Query, QueryExt, Term};
pub use row::{Binding, Row, RowStream};
pub use traits::{ContentFetcher, EntitySearcher, KnowledgeGraph, SparqlExecutor};

// Re-export macro (defined at crate root via #[macro_export])
#[doc(inline)]
pub use crate::sparql;
