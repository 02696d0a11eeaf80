//! Domain models for knowledge-graph search and classification.

mod candidate;
mod entity;
mod glossary;
mod policy;
mod type_ref;

pub use candidate::{Candidate, Hit, MatchContext};
pub use entity::{to_entity_id, EntityId, ENTITY_URI_PREFIX};
pub use glossary::{
    ConceptInfo, ConceptInstance, ConceptInstances, GlossaryEntry, LocalizedNames,
    CYBER_CONCEPTS, INSTANCE_LANGUAGES,
};
pub use policy::{TypeIdSet, TypePolicy};
pub use type_ref::{TypeRef, TypeSet};
