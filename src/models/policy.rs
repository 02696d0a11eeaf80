//! Type policies: required, allowed and denied type ids.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{EntityId, TypeRef};
use crate::error::AppError;

/// Set of type ids with optional display labels.
///
/// Membership is by id only. Deserializes from either a list of ids or a
/// table mapping ids to labels; malformed ids fail deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TypeIdSetRepr")]
pub struct TypeIdSet(BTreeMap<EntityId, Option<String>>);

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeIdSetRepr {
    List(Vec<String>),
    Labeled(BTreeMap<String, String>),
}

impl TryFrom<TypeIdSetRepr> for TypeIdSet {
    type Error = AppError;

    fn try_from(repr: TypeIdSetRepr) -> Result<Self, Self::Error> {
        match repr {
            TypeIdSetRepr::List(ids) => ids.iter().map(|id| EntityId::parse(id)).collect(),
            TypeIdSetRepr::Labeled(map) => map
                .into_iter()
                .map(|(id, label)| Ok(TypeRef::new(EntityId::parse(&id)?, Some(label))))
                .collect(),
        }
    }
}

impl TypeIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: EntityId, label: Option<String>) {
        let slot = self.0.entry(id).or_insert(None);
        if slot.is_none() {
            *slot = label;
        }
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.0.contains_key(id)
    }

    pub fn label(&self, id: &EntityId) -> Option<&str> {
        self.0.get(id).and_then(|l| l.as_deref())
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Parses a comma-separated list of ids, e.g. `"Q5,Q68"`.
    pub fn parse_list(list: &str) -> Result<Self, AppError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(EntityId::parse)
            .collect()
    }

    fn extend_from(&mut self, other: TypeIdSet) {
        for (id, label) in other.0 {
            self.insert(id, label);
        }
    }
}

impl FromIterator<EntityId> for TypeIdSet {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        Self(iter.into_iter().map(|id| (id, None)).collect())
    }
}

impl FromIterator<TypeRef> for TypeIdSet {
    fn from_iter<I: IntoIterator<Item = TypeRef>>(iter: I) -> Self {
        let mut set = TypeIdSet::new();
        for t in iter {
            set.insert(t.id, t.label);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for TypeIdSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(EntityId::from_ref).collect()
    }
}

/// Caller-supplied policy deciding which candidates are kept.
///
/// - `required`: at least one must be among a candidate's types
///   (vacuously satisfied when empty)
/// - `allow`: types worth reporting on an accepted candidate
/// - `deny`: any one of these disqualifies the candidate
///
/// An id may not appear in both `allow` and `deny`; [`TypePolicy::new`]
/// rejects such policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypePolicy {
    required: TypeIdSet,
    allow: TypeIdSet,
    deny: TypeIdSet,
}

impl TypePolicy {
    /// Builds a policy, failing if any id is both allowed and denied.
    pub fn new(required: TypeIdSet, allow: TypeIdSet, deny: TypeIdSet) -> Result<Self, AppError> {
        let policy = Self {
            required,
            allow,
            deny,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// A policy with no constraints: every typed candidate is accepted.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Built-in cybersecurity policy.
    pub fn cybersecurity() -> Self {
        CYBERSECURITY.clone()
    }

    /// Returns a copy of this policy with additional ids merged in.
    pub fn extended(
        &self,
        required: TypeIdSet,
        allow: TypeIdSet,
        deny: TypeIdSet,
    ) -> Result<Self, AppError> {
        let mut merged = self.clone();
        merged.required.extend_from(required);
        merged.allow.extend_from(allow);
        merged.deny.extend_from(deny);
        merged.validate()?;
        Ok(merged)
    }

    pub fn required(&self) -> &TypeIdSet {
        &self.required
    }

    pub fn allow(&self) -> &TypeIdSet {
        &self.allow
    }

    pub fn deny(&self) -> &TypeIdSet {
        &self.deny
    }

    fn validate(&self) -> Result<(), AppError> {
        let overlap: Vec<&str> = self
            .allow
            .ids()
            .filter(|id| self.deny.contains(id))
            .map(EntityId::as_str)
            .collect();

        if overlap.is_empty() {
            Ok(())
        } else {
            Err(AppError::Policy(format!(
                "type ids appear in both allow and deny: {}",
                overlap.join(", ")
            )))
        }
    }
}

/// Cybersecurity-relevant types: one of these is worth surfacing on a hit.
const CYBER_ALLOW: &[(&str, &str)] = &[
    ("Q5", "human"),
    ("Q43229", "organization"),
    ("Q82794", "geographic region"),
    ("Q1048835", "political territorial entity"),
    ("Q7397", "software"),
    ("Q205663", "process"),
    ("Q68", "computer"),
    ("Q1301371", "network"),
    ("Q14001", "malware"),
    ("Q783794", "company"),
    ("Q161157", "password"),
    ("Q1541645", "process identifier"),
    ("Q4418000", "network address"),
    ("Q5830907", "computer memory"),
    ("Q82753", "computer file"),
    ("Q2904148", "information leak"),
    ("Q4071928", "cyberattack"),
    ("Q477202", "cryptographic hash function"),
    ("Q141090", "encryption"),
    ("Q5227362", "data theft"),
    ("Q631425", "computer vulnerability"),
    ("Q627226", "Common Vulnerabilities and Exposures"),
    ("Q2801262", "hacker group"),
    ("Q2798820", "security hacker"),
    ("Q8142", "currency"),
    ("Q2587068", "sensitive information"),
    ("Q3966", "computer hardware"),
    ("Q17517", "mobile phone"),
    ("Q986008", "payment system"),
    ("Q13479982", "cryptocurrency"),
    ("Q20826013", "software version"),
    ("Q20631656", "software release"),
    ("Q44601380", "property that may violate privacy"),
    ("Q1058914", "software company"),
    ("Q278610", "dropper"),
    ("Q1332289", "black hat"),
    ("Q22685", "hacktivism"),
    ("Q47913", "intelligence agency"),
    ("Q28344495", "computer security consultant"),
    ("Q26102", "whistleblower"),
    ("Q317671", "botnet"),
    ("Q9135", "operating system"),
    ("Q4825885", "authentication protocol"),
    ("Q2659904", "government organization"),
    ("Q1668024", "service on internet"),
    ("Q202833", "social media"),
    ("Q870898", "computer security software"),
];

/// Types that rule a candidate out of a cybersecurity search.
const CYBER_DENY: &[(&str, &str)] = &[
    ("Q4438121", "sports organization"),
    ("Q11410", "game"),
    ("Q14897293", "fictional entity"),
    ("Q32178211", "music organisation"),
    ("Q16010345", "performer"),
    ("Q483501", "artist"),
    ("Q56678558", "unknown composer author"),
    ("Q28555911", "ordinary matter"),
    ("Q49848", "document"),
];

fn labeled_set(entries: &[(&str, &str)]) -> TypeIdSet {
    entries
        .iter()
        .map(|(id, label)| TypeRef::labeled(*id, label))
        .collect()
}

static CYBERSECURITY: Lazy<TypePolicy> = Lazy::new(|| TypePolicy {
    required: TypeIdSet::new(),
    allow: labeled_set(CYBER_ALLOW),
    deny: labeled_set(CYBER_DENY),
});

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> TypeIdSet {
        list.iter().copied().collect()
    }

    #[test]
    fn test_overlap_between_allow_and_deny_rejected() {
        let result = TypePolicy::new(ids(&[]), ids(&["Q1", "Q2"]), ids(&["Q2", "Q3"]));
        match result {
            Err(AppError::Policy(msg)) => assert!(msg.contains("Q2")),
            other => panic!("expected policy error, got {:?}", other),
        }
    }

    #[test]
    fn test_required_may_overlap_allow() {
        assert!(TypePolicy::new(ids(&["Q5"]), ids(&["Q5"]), ids(&["Q11410"])).is_ok());
    }

    #[test]
    fn test_cybersecurity_preset_is_valid() {
        let policy = TypePolicy::cybersecurity();
        assert!(policy.validate().is_ok());
        assert!(policy.required().is_empty());
        assert!(policy.allow().contains(&EntityId::from("Q4071928")));
        assert!(policy.deny().contains(&EntityId::from("Q11410")));
        assert_eq!(
            policy.allow().label(&EntityId::from("Q14001")),
            Some("malware")
        );
    }

    #[test]
    fn test_extended_revalidates() {
        let base = TypePolicy::cybersecurity();
        let err = base.extended(ids(&[]), ids(&["Q11410"]), ids(&[]));
        assert!(matches!(err, Err(AppError::Policy(_))));

        let ok = base.extended(ids(&["Q7397"]), ids(&[]), ids(&[])).unwrap();
        assert!(ok.required().contains(&EntityId::from("Q7397")));
    }

    #[test]
    fn test_parse_list() {
        let set = TypeIdSet::parse_list("Q783794, Q2659904,").unwrap();
        assert_eq!(set.len(), 2);
        assert!(TypeIdSet::parse_list("Q5,human").is_err());
    }

    #[test]
    fn test_deserializes_list_or_table() {
        let list: TypeIdSet = serde_json::from_str(r#"["Q5", "Q68"]"#).unwrap();
        assert_eq!(list.len(), 2);

        let table: TypeIdSet = serde_json::from_str(r#"{"Q14001": "malware"}"#).unwrap();
        assert_eq!(table.label(&EntityId::from("Q14001")), Some("malware"));
    }

    #[test]
    fn test_deserialize_rejects_malformed_ids() {
        assert!(serde_json::from_str::<TypeIdSet>(r#"["Q5", "game"]"#).is_err());
        assert!(serde_json::from_str::<TypeIdSet>(r#"{"malware": "malware"}"#).is_err());

        let uri: TypeIdSet =
            serde_json::from_str(r#"["http://www.wikidata.org/entity/Q14001"]"#).unwrap();
        assert!(uri.contains(&EntityId::from("Q14001")));
    }
}
