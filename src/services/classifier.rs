//! Policy-based classification of resolved type sets.

use serde::Serialize;

use crate::models::{TypePolicy, TypeSet};

/// Outcome of classifying one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "matched", rename_all = "lowercase")]
pub enum Classification {
    /// Kept, annotated with the types that were required or allowed.
    Accepted(TypeSet),
    /// Dropped by a denied type or a missing required type.
    Rejected,
}

impl Classification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Classification::Accepted(_))
    }

    /// The annotated types of an accepted candidate.
    pub fn matched(&self) -> Option<&TypeSet> {
        match self {
            Classification::Accepted(matched) => Some(matched),
            Classification::Rejected => None,
        }
    }

    pub fn into_matched(self) -> Option<TypeSet> {
        match self {
            Classification::Accepted(matched) => Some(matched),
            Classification::Rejected => None,
        }
    }
}

/// Classifies a resolved type set against a policy.
///
/// One pass over `types` in order. A denied type rejects immediately and
/// nothing accumulated so far is returned. Required and allowed types are
/// collected into the matched set. After the pass the candidate is
/// rejected if `policy.required` is non-empty and none of it was seen.
pub fn classify(types: &TypeSet, policy: &TypePolicy) -> Classification {
    let mut matched = TypeSet::new();
    let mut found_required = policy.required().is_empty();

    for type_ref in types.iter() {
        if policy.deny().contains(&type_ref.id) {
            return Classification::Rejected;
        }

        if policy.required().contains(&type_ref.id) {
            found_required = true;
            matched.insert(type_ref.clone());
        } else if policy.allow().contains(&type_ref.id) {
            matched.insert(type_ref.clone());
        }
    }

    if found_required {
        Classification::Accepted(matched)
    } else {
        Classification::Rejected
    }
}
