//! Business logic services for search, classification and glossaries.
//!
//! Services orchestrate repositories and apply type policies, using the
//! `FromContext` derive macro for dependency injection.

mod classifier;
mod glossary;
mod search;

pub use classifier::{classify, Classification};
pub use glossary::{cyber_concepts, glossary_file_name, GlossaryService};
pub use search::{ResolutionMode, SearchOptions, SearchService, MAX_CONCURRENCY};
