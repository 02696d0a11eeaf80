//! Glossary building for whole concepts.

use std::path::{Path, PathBuf};

use futures::{stream, StreamExt};

use crate::context::{AppGraph, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{ConceptInstances, EntityId, GlossaryEntry, CYBER_CONCEPTS};
use crate::repositories::ConceptRepository;

/// Concurrent article fetches while filling entry text.
const TEXT_CONCURRENCY: usize = 4;

/// The default concept list as `(id, label)` pairs.
pub fn cyber_concepts() -> Vec<(EntityId, String)> {
    CYBER_CONCEPTS
        .iter()
        .map(|(id, label)| (EntityId::from(*id), label.to_string()))
        .collect()
}

/// File name used when dumping a concept's glossary.
pub fn glossary_file_name(label: &str) -> String {
    let stem: String = label
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{}.json", stem)
}

/// Service assembling glossary entries and concept instance lists.
#[derive(FromContext, Clone)]
pub struct GlossaryService {
    graph: AppGraph,
    concepts: ConceptRepository,
}

impl GlossaryService {
    /// Builds glossary entries for every member of `concept`.
    ///
    /// With `with_text`, linked articles are fetched for their introduction.
    /// A failed fetch is logged and leaves that entry's text empty.
    pub async fn build(
        &self,
        concept: &EntityId,
        with_text: bool,
    ) -> Result<Vec<GlossaryEntry>, AppError> {
        let entries = self.concepts.members(concept).await?;
        if !with_text {
            return Ok(entries);
        }

        let fetcher = &self.graph;
        let entries: Vec<GlossaryEntry> = stream::iter(entries)
            .map(|mut entry| async move {
                if let Some(link) = entry.link.as_deref() {
                    match fetcher.fetch_extract(link).await {
                        Ok(text) => entry.text = text,
                        Err(e) => {
                            tracing::warn!(item = %entry.item, link, error = %e, "Failed to fetch article text")
                        }
                    }
                }
                entry
            })
            .buffered(TEXT_CONCURRENCY)
            .collect()
            .await;

        Ok(entries)
    }

    /// Lists up to `limit` instances of `concept` with its name and description.
    pub async fn instances(
        &self,
        concept: &EntityId,
        limit: usize,
    ) -> Result<ConceptInstances, AppError> {
        let info = self
            .concepts
            .describe(concept)
            .await?
            .ok_or_else(|| AppError::EntityNotFound(concept.to_string()))?;
        let instances = self.concepts.instances(concept, limit).await?;

        Ok(ConceptInstances {
            type_id: info.id,
            type_name: info.name,
            type_description: info.description,
            instances,
        })
    }

    /// Writes one pretty-printed JSON glossary per concept into `out_dir`.
    ///
    /// Returns the written paths in input order.
    pub async fn dump(
        &self,
        concepts: &[(EntityId, String)],
        out_dir: &Path,
        with_text: bool,
    ) -> Result<Vec<PathBuf>, AppError> {
        tokio::fs::create_dir_all(out_dir).await?;

        let mut written = Vec::with_capacity(concepts.len());
        for (id, label) in concepts {
            let entries = self.build(id, with_text).await?;
            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| AppError::Internal(format!("Failed to serialize glossary: {}", e)))?;

            let path = out_dir.join(glossary_file_name(label));
            tokio::fs::write(&path, json).await?;

            tracing::info!(concept = %id, entries = entries.len(), path = %path.display(), "Wrote glossary");
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::di::FromRef;
    use crate::graph::backends::mock::MockGraph;
    use crate::graph::{Binding, Row};

    const PETYA_LINK: &str = "https://en.wikipedia.org/wiki/Petya_(malware)";
    const MIRAI_LINK: &str = "https://en.wikipedia.org/wiki/Mirai_(malware)";

    fn member(id: &str, label: &str, link: Option<&str>) -> Row {
        let mut pairs = vec![
            ("item", Binding::uri(EntityId::from(id).uri())),
            ("itemLabel", Binding::lang_literal(label, "en")),
        ];
        if let Some(link) = link {
            pairs.push(("link", Binding::uri(link)));
        }
        Row::from_pairs(pairs)
    }

    fn malware_graph() -> MockGraph {
        MockGraph::new().with_rows(
            "concept",
            "Q14001",
            vec![
                member("Q23670513", "Petya", Some(PETYA_LINK)),
                member("Q27850640", "Mirai", Some(MIRAI_LINK)),
                member("Q1", "unlinked", None),
            ],
        )
    }

    fn service(graph: MockGraph) -> GlossaryService {
        let ctx = Context::new(Arc::new(graph), Config::default());
        GlossaryService::from_ref(&ctx)
    }

    #[test]
    fn test_glossary_file_name() {
        assert_eq!(glossary_file_name("computer security consultant"), "computer_security_consultant.json");
        assert_eq!(glossary_file_name("TCP/IP"), "TCP_IP.json");
    }

    #[test]
    fn test_cyber_concepts_are_well_formed() {
        let concepts = cyber_concepts();
        assert_eq!(concepts.len(), CYBER_CONCEPTS.len());
        assert!(concepts.iter().all(|(id, _)| id.is_well_formed()));
    }

    #[tokio::test]
    async fn test_build_without_text() {
        let glossary = service(malware_graph().with_extract(PETYA_LINK, "Petya is..."));
        let entries = glossary.build(&"Q14001".into(), false).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.text.is_none()));
    }

    #[tokio::test]
    async fn test_build_with_text_tolerates_fetch_failures() {
        let glossary = service(
            malware_graph()
                .with_extract(PETYA_LINK, "Petya is a family of encrypting malware.")
                .with_failing_extract(MIRAI_LINK),
        );

        let entries = glossary.build(&"Q14001".into(), true).await.unwrap();
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Petya", "Mirai", "unlinked"]);
        assert_eq!(
            entries[0].text.as_deref(),
            Some("Petya is a family of encrypting malware.")
        );
        assert!(entries[1].text.is_none());
        assert!(entries[2].text.is_none());
    }

    #[tokio::test]
    async fn test_instances_requires_described_concept() {
        let glossary = service(MockGraph::new());
        let err = glossary.instances(&"Q1248784".into(), 10).await.unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }

    #[tokio::test]
    async fn test_instances() {
        let describe = Row::from_pairs([
            ("name", Binding::lang_literal("airport", "en")),
            ("description", Binding::lang_literal("aerodrome with facilities", "en")),
        ]);
        let instance = Row::from_pairs([
            ("ent", Binding::uri("http://www.wikidata.org/entity/Q671475")),
            ("name_en", Binding::lang_literal("Logan International Airport", "en")),
        ]);
        // Describe and instance queries share the `concept` key; the mock
        // answers both with the same rows, so the describe row carries both.
        let mut pairs = describe.into_inner();
        pairs.extend(instance.into_inner());
        let glossary = service(MockGraph::new().with_rows(
            "concept",
            "Q1248784",
            vec![Row::new(pairs)],
        ));

        let result = glossary.instances(&"Q1248784".into(), 10).await.unwrap();
        assert_eq!(result.type_name, "airport");
        assert_eq!(result.instances.len(), 1);
        assert_eq!(result.instances[0].id.as_str(), "Q671475");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "airport");
        assert_eq!(json["type_description"], "aerodrome with facilities");
    }

    #[tokio::test]
    async fn test_dump_writes_one_file_per_concept() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("glossary");
        let glossary = service(malware_graph());

        let concepts = vec![
            (EntityId::from("Q14001"), "malware".to_string()),
            (EntityId::from("Q317671"), "botnet".to_string()),
        ];
        let paths = glossary.dump(&concepts, &out, false).await.unwrap();

        assert_eq!(paths, [out.join("malware.json"), out.join("botnet.json")]);

        let malware: Vec<GlossaryEntry> =
            serde_json::from_str(&std::fs::read_to_string(&paths[0]).unwrap()).unwrap();
        assert_eq!(malware.len(), 3);

        let botnet: Vec<GlossaryEntry> =
            serde_json::from_str(&std::fs::read_to_string(&paths[1]).unwrap()).unwrap();
        assert!(botnet.is_empty());
    }
}
