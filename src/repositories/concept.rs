//! Concept lookups used to build glossaries.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::Config;
use crate::context::{AppGraph, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{QueryExt, Row};
use crate::models::{
    ConceptInfo, ConceptInstance, EntityId, GlossaryEntry, LocalizedNames, INSTANCE_LANGUAGES,
};

const LIST_SEPARATOR: char = '|';

const FALLBACK_SITE: &str = "https://en.wikipedia.org/";

const MEMBERS_QUERY: &str = r#"
SELECT ?item ?itemLabel ?itemDescription ?link
  (GROUP_CONCAT(DISTINCT ?alias; separator = "|") AS ?aliases)
  (GROUP_CONCAT(DISTINCT ?superClassLabel; separator = "|") AS ?superClasses)
  (GROUP_CONCAT(DISTINCT ?typeLabel; separator = "|") AS ?types)
WHERE {
  ?item wdt:P31/wdt:P279*|wdt:P279+ $concept .
  OPTIONAL { ?item skos:altLabel ?alias . FILTER (lang(?alias) = $lang) }
  OPTIONAL {
    ?item wdt:P279 ?superClass .
    ?superClass rdfs:label ?superClassLabel .
    FILTER (lang(?superClassLabel) = $lang)
  }
  OPTIONAL {
    ?item wdt:P31 ?type .
    ?type rdfs:label ?typeLabel .
    FILTER (lang(?typeLabel) = $lang)
  }
  OPTIONAL { ?link schema:about ?item ; schema:isPartOf $site . }
  SERVICE wikibase:label { bd:serviceParam wikibase:language $lang . }
}
GROUP BY ?item ?itemLabel ?itemDescription ?link
ORDER BY ?item"#;

const DESCRIBE_QUERY: &str = r#"
SELECT ?name ?description WHERE {
  $concept rdfs:label ?name .
  FILTER (lang(?name) = $lang)
  OPTIONAL {
    $concept schema:description ?description .
    FILTER (lang(?description) = $lang)
  }
}
LIMIT 1"#;

/// Instances of a concept with a name and aliases per reported language.
static INSTANCES_QUERY: Lazy<String> = Lazy::new(|| {
    let mut select = String::from("SELECT ?ent");
    let mut optionals = String::new();
    let mut group_by = String::from("GROUP BY ?ent");

    for lang in INSTANCE_LANGUAGES {
        let _ = write!(
            select,
            " ?name_{lang} (GROUP_CONCAT(DISTINCT ?alias_{lang}; separator = \"|\") AS ?aliases_{lang})"
        );
        let _ = write!(
            optionals,
            "  OPTIONAL {{ ?ent rdfs:label ?name_{lang} . FILTER (lang(?name_{lang}) = \"{lang}\") }}\n  \
             OPTIONAL {{ ?ent skos:altLabel ?alias_{lang} . FILTER (lang(?alias_{lang}) = \"{lang}\") }}\n"
        );
        let _ = write!(group_by, " ?name_{lang}");
    }

    format!(
        "{select}\nWHERE {{\n  ?ent wdt:P31/wdt:P279* $concept .\n{optionals}}}\n{group_by}\nLIMIT $limit"
    )
});

/// Repository for concept members, descriptions and instances.
#[derive(FromContext, Clone)]
pub struct ConceptRepository {
    graph: AppGraph,
    config: Arc<Config>,
}

impl ConceptRepository {
    /// Lists every subclass or instance of `concept` with glossary fields.
    ///
    /// The `text` of each entry is left empty.
    pub async fn members(&self, concept: &EntityId) -> Result<Vec<GlossaryEntry>, AppError> {
        let site = wikipedia_site(&self.config.endpoint.wikipedia_url);
        let rows = self
            .graph
            .query(MEMBERS_QUERY)
            .entity("concept", concept)
            .literal("lang", &self.config.endpoint.language, None)
            .iri("site", &site)
            .fetch_all()
            .await?;

        tracing::debug!(concept = %concept, members = rows.len(), "Fetched concept members");

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Returns the name and description of a concept, if it has both.
    pub async fn describe(&self, concept: &EntityId) -> Result<Option<ConceptInfo>, AppError> {
        let row = self
            .graph
            .query(DESCRIBE_QUERY)
            .entity("concept", concept)
            .literal("lang", &self.config.endpoint.language, None)
            .fetch_one()
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ConceptInfo {
            id: concept.clone(),
            name: row.get("name")?.to_string(),
            description: row
                .get_opt("description")
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        }))
    }

    /// Lists up to `limit` instances of `concept` with localized names.
    pub async fn instances(
        &self,
        concept: &EntityId,
        limit: usize,
    ) -> Result<Vec<ConceptInstance>, AppError> {
        let rows = self
            .graph
            .query(&INSTANCES_QUERY)
            .entity("concept", concept)
            .param("limit", limit)
            .fetch_all()
            .await?;

        rows.iter().map(Self::row_to_instance).collect()
    }

    fn row_to_entry(row: &Row) -> Result<GlossaryEntry, AppError> {
        let item = row
            .get_entity("item")
            .map_err(|e| AppError::parse("concept members", e))?;
        let label = row
            .get_opt("itemLabel")
            .unwrap_or(item.as_str())
            .to_string();

        Ok(GlossaryEntry {
            label,
            description: non_empty(row.get_opt("itemDescription")),
            link: non_empty(row.get_opt("link")),
            aliases: row.get_list("aliases", LIST_SEPARATOR),
            super_classes: row.get_list("superClasses", LIST_SEPARATOR),
            types: row.get_list("types", LIST_SEPARATOR),
            text: None,
            item,
        })
    }

    fn row_to_instance(row: &Row) -> Result<ConceptInstance, AppError> {
        let url = row
            .get("ent")
            .map_err(|e| AppError::parse("concept instances", e))?;

        let mut names = BTreeMap::new();
        for lang in INSTANCE_LANGUAGES {
            let localized = LocalizedNames {
                name: non_empty(row.get_opt(&format!("name_{lang}"))),
                alias: row.get_list(&format!("aliases_{lang}"), LIST_SEPARATOR),
            };
            if !localized.is_empty() {
                names.insert(lang.to_string(), localized);
            }
        }

        Ok(ConceptInstance {
            url: url.to_string(),
            id: EntityId::from_ref(url),
            names,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Site IRI of the encyclopedia behind an action API URL.
fn wikipedia_site(api_url: &str) -> String {
    reqwest::Url::parse(api_url)
        .ok()
        .and_then(|url| {
            url.host_str()
                .map(|host| format!("{}://{}/", url.scheme(), host))
        })
        .unwrap_or_else(|| FALLBACK_SITE.to_string())
}
