//! Type references and ordered type sets.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::EntityId;

/// A type (class) of an entity: its id plus an optional human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TypeRef {
    pub fn new(id: impl Into<EntityId>, label: Option<String>) -> Self {
        Self {
            id: id.into(),
            label: label.filter(|l| !l.is_empty()),
        }
    }

    /// Shorthand for a type with a known label.
    pub fn labeled(id: impl Into<EntityId>, label: &str) -> Self {
        Self::new(id, Some(label.to_string()))
    }
}

/// Set of types keyed by id, iterated in insertion order.
///
/// The first label seen for an id is kept; later rows for the same id are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TypeRef>", into = "Vec<TypeRef>")]
pub struct TypeSet {
    types: Vec<TypeRef>,
    #[serde(skip)]
    ids: HashSet<EntityId>,
}

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a type, returning false if its id was already present.
    pub fn insert(&mut self, type_ref: TypeRef) -> bool {
        if !self.ids.insert(type_ref.id.clone()) {
            return false;
        }
        self.types.push(type_ref);
        true
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&TypeRef> {
        if !self.contains(id) {
            return None;
        }
        self.types.iter().find(|t| &t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeRef> {
        self.types.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.types.iter().map(|t| &t.id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn into_vec(self) -> Vec<TypeRef> {
        self.types
    }
}

impl FromIterator<TypeRef> for TypeSet {
    fn from_iter<I: IntoIterator<Item = TypeRef>>(iter: I) -> Self {
        let mut set = TypeSet::new();
        for type_ref in iter {
            set.insert(type_ref);
        }
        set
    }
}

impl From<Vec<TypeRef>> for TypeSet {
    fn from(types: Vec<TypeRef>) -> Self {
        types.into_iter().collect()
    }
}

impl From<TypeSet> for Vec<TypeRef> {
    fn from(set: TypeSet) -> Self {
        set.types
    }
}

impl IntoIterator for TypeSet {
    type Item = TypeRef;
    type IntoIter = std::vec::IntoIter<TypeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.into_iter()
    }
}

impl<'a> IntoIterator for &'a TypeSet {
    type Item = &'a TypeRef;
    type IntoIter = std::slice::Iter<'a, TypeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}
