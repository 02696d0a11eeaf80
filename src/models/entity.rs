//! Entity identifiers for knowledge-graph nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Canonical URI prefix of Wikidata entities.
pub const ENTITY_URI_PREFIX: &str = "http://www.wikidata.org/entity/";

/// Same prefix as served over TLS; normalizes to the same bare id.
const ENTITY_URI_PREFIX_TLS: &str = "https://www.wikidata.org/entity/";

/// Identifier of a knowledge-graph node (an entity or a type), e.g. `Q14001`.
///
/// Always stored in bare form. The canonical URI form is available via
/// [`EntityId::uri`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Normalizes a bare id or a canonical entity URI.
    ///
    /// Unrecognized input is kept as-is.
    pub fn from_ref(reference: &str) -> Self {
        let bare = reference
            .strip_prefix(ENTITY_URI_PREFIX)
            .or_else(|| reference.strip_prefix(ENTITY_URI_PREFIX_TLS))
            .unwrap_or(reference);
        Self(bare.to_string())
    }

    /// Normalizes and validates a reference as an item or property id.
    ///
    /// Only validated ids may be bound into queries.
    pub fn parse(reference: &str) -> Result<Self, AppError> {
        let id = Self::from_ref(reference.trim());
        if id.is_well_formed() {
            Ok(id)
        } else {
            Err(AppError::InvalidEntityId(reference.to_string()))
        }
    }

    /// Returns the bare identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the canonical URI of this entity.
    pub fn uri(&self) -> String {
        format!("{}{}", ENTITY_URI_PREFIX, self.0)
    }

    /// True for `Q<digits>` or `P<digits>` ids.
    pub fn is_well_formed(&self) -> bool {
        let mut chars = self.0.chars();
        matches!(chars.next(), Some('Q' | 'P'))
            && self.0.len() > 1
            && chars.all(|c| c.is_ascii_digit())
    }
}

/// Extracts the bare identifier from a full entity URI or a bare id.
pub fn to_entity_id(reference: &str) -> EntityId {
    EntityId::from_ref(reference)
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from_ref(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::from_ref(&s)
    }
}

impl std::str::FromStr for EntityId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_and_bare_forms_normalize_equal() {
        let from_uri = to_entity_id("http://www.wikidata.org/entity/Q29957041");
        let bare = to_entity_id("Q29957041");
        assert_eq!(from_uri, bare);
        assert_eq!(from_uri.as_str(), "Q29957041");
    }

    #[test]
    fn test_tls_uri_normalizes() {
        assert_eq!(
            to_entity_id("https://www.wikidata.org/entity/Q5").as_str(),
            "Q5"
        );
    }

    #[test]
    fn test_unrecognized_reference_returned_unchanged() {
        let id = to_entity_id("https://example.org/thing/7");
        assert_eq!(id.as_str(), "https://example.org/thing/7");
        assert!(!id.is_well_formed());
    }

    #[test]
    fn test_uri_roundtrip() {
        let id = to_entity_id("Q14001");
        assert_eq!(id.uri(), "http://www.wikidata.org/entity/Q14001");
        assert_eq!(to_entity_id(&id.uri()), id);
    }

    #[test]
    fn test_parse_validates_shape() {
        assert!(EntityId::parse("Q7397").is_ok());
        assert!(EntityId::parse("P31").is_ok());
        assert!(EntityId::parse(" http://www.wikidata.org/entity/Q68 ").is_ok());
        assert!(EntityId::parse("Q").is_err());
        assert!(EntityId::parse("Q12 . ?x ?y ?z").is_err());
        assert!(EntityId::parse("malware").is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = to_entity_id("Q4071928");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"Q4071928\"");
    }
}
