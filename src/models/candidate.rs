//! Search candidates and classified hits.

use serde::{Deserialize, Serialize};

use super::{EntityId, TypeSet};

/// Which field of an entity matched the search text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchContext {
    /// Matched field, e.g. `label` or `alias`.
    #[serde(rename = "type")]
    pub field: String,
    /// The matched text.
    pub text: String,
    /// Language of the matched text.
    pub language: String,
}

/// A raw hit from the upstream name/label search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: EntityId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_context: Option<MatchContext>,
}

impl Candidate {
    pub fn new(id: impl Into<EntityId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            match_context: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Canonical URI of the candidate entity.
    pub fn concept_uri(&self) -> String {
        self.id.uri()
    }
}

/// A candidate accepted by the classifier, annotated with its matched types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(flatten)]
    pub candidate: Candidate,
    #[serde(rename = "concepturi")]
    pub concept_uri: String,
    pub types: TypeSet,
}

impl Hit {
    pub fn new(candidate: Candidate, types: TypeSet) -> Self {
        Self {
            concept_uri: candidate.concept_uri(),
            candidate,
            types,
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.candidate.id
    }

    pub fn label(&self) -> &str {
        &self.candidate.label
    }
}
