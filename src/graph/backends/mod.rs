//! Backend implementations for knowledge-graph services.
//!
//! Each backend implements the core traits from [`crate::graph::traits`]:
//!
//! - [`SparqlExecutor`](crate::graph::SparqlExecutor) - Required
//! - [`EntitySearcher`](crate::graph::EntitySearcher) - Required
//! - [`ContentFetcher`](crate::graph::ContentFetcher) - Required
//!
//! # Available Backends
//!
//! | Backend | Module | Status |
//! |---------|--------|--------|
//! | Wikidata + Wikipedia over HTTP | [`wikidata`] | Available |
//! | In-memory fixtures | `mock` | Tests only |

pub mod wikidata;

#[cfg(test)]
pub(crate) mod mock;
