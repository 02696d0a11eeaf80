//! Glossary records for members of a concept.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::EntityId;

/// A subclass or instance of a concept, with the text useful for a glossary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryEntry {
    pub item: EntityId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// English encyclopedia article about the item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Labels of the immediate superclasses.
    #[serde(default)]
    pub super_classes: Vec<String>,
    /// Labels of the immediate types.
    #[serde(default)]
    pub types: Vec<String>,
    /// Introductory text of the linked article, when fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Name and description of a concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptInfo {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Names and aliases of an entity in one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedNames {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<String>,
}

impl LocalizedNames {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.alias.is_empty()
    }
}

/// An instance of a concept with its names keyed by language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptInstance {
    pub url: String,
    pub id: EntityId,
    #[serde(flatten)]
    pub names: BTreeMap<String, LocalizedNames>,
}

/// A concept together with its instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptInstances {
    pub type_id: EntityId,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_description: Option<String>,
    pub instances: Vec<ConceptInstance>,
}

/// Languages reported for concept instances.
pub const INSTANCE_LANGUAGES: &[&str] = &["en", "ru", "zh"];

/// Cybersecurity concepts exported by default when building a glossary.
pub const CYBER_CONCEPTS: &[(&str, &str)] = &[
    ("Q14001", "malware"),
    ("Q4071928", "cyberattack"),
    ("Q477202", "cryptographic hash function"),
    ("Q5227362", "data theft"),
    ("Q631425", "computer vulnerability"),
    ("Q2798820", "security hacker"),
    ("Q2587068", "sensitive information"),
    ("Q13479982", "cryptocurrency"),
    ("Q47913", "intelligence agency"),
    ("Q28344495", "computer security consultant"),
    ("Q317671", "botnet"),
    ("Q4825885", "authentication protocol"),
];
