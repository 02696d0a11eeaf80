//! Data access layer for graph operations.
//!
//! Repositories wrap the SPARQL queries behind typed methods and are
//! resolved from the application context with `#[derive(FromContext)]`.

mod concept;
mod types;

pub use concept::ConceptRepository;
pub use types::TypeRepository;
