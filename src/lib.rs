//! Cyberlex - knowledge-graph entity search and type classification
//!
//! Searches a public knowledge graph by text, resolves each candidate's
//! transitive type closure and keeps the candidates a type policy accepts,
//! in the upstream relevance order. Also builds glossaries of every member
//! of a concept.

pub mod cli;
pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod graph;
pub mod mcp;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export FromRef at crate root for di-macros generated code
pub use di::FromRef;
