//! Type resolution against the knowledge graph.

use std::sync::Arc;

use crate::config::Config;
use crate::context::{AppGraph, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{QueryExt, Row};
use crate::models::{EntityId, TypeRef, TypeSet};
use crate::sparql;

/// Every class the item is an instance of (following subclass chains
/// upward), plus every class the item is itself a subclass of.
const TYPE_CLOSURE_QUERY: &str = r#"
SELECT DISTINCT ?type ?typeLabel WHERE {
  { $item wdt:P31/wdt:P279* ?type . }
  UNION
  { $item wdt:P279+ ?type . }
  SERVICE wikibase:label { bd:serviceParam wikibase:language $lang . }
}"#;

/// True when the item takes part in the class hierarchy at all.
const IS_TYPE_QUERY: &str = "ASK { ?x wdt:P31|wdt:P279|^wdt:P279 $item . }";

/// Repository resolving the types of an entity.
#[derive(FromContext, Clone)]
pub struct TypeRepository {
    graph: AppGraph,
    config: Arc<Config>,
}

impl TypeRepository {
    /// Resolves the transitive type closure of an entity.
    ///
    /// Types are unique by id and keep the order the endpoint returned
    /// them in. Any failure is reported as a resolution error naming `id`.
    pub async fn resolve_types(&self, id: &EntityId) -> Result<TypeSet, AppError> {
        self.fetch_closure(id)
            .await
            .map_err(|e| AppError::resolution(id.as_str(), e))
    }

    /// Checks whether an entity is used as a class anywhere in the graph.
    pub async fn is_type(&self, id: &EntityId) -> Result<bool, AppError> {
        sparql!(self.graph, IS_TYPE_QUERY, item = id).ask().await
    }

    async fn fetch_closure(&self, id: &EntityId) -> Result<TypeSet, AppError> {
        let rows = self
            .graph
            .query(TYPE_CLOSURE_QUERY)
            .entity("item", id)
            .literal("lang", &self.config.endpoint.language, None)
            .fetch_all()
            .await?;

        tracing::debug!(id = %id, rows = rows.len(), "Resolved type closure");

        rows.iter().map(Self::row_to_type_ref).collect()
    }

    fn row_to_type_ref(row: &Row) -> Result<TypeRef, AppError> {
        let id = row
            .get_entity("type")
            .map_err(|e| AppError::parse("type closure", e))?;

        // The label service echoes the id when no label exists.
        let label = row
            .get_opt("typeLabel")
            .filter(|label| *label != id.as_str())
            .map(str::to_string);

        Ok(TypeRef::new(id, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::FromRef;
    use crate::graph::backends::mock::MockGraph;
    use crate::graph::Binding;

    fn repo(graph: MockGraph) -> TypeRepository {
        let ctx = Context::new(Arc::new(graph), Config::default());
        TypeRepository::from_ref(&ctx)
    }

    #[tokio::test]
    async fn test_resolve_types_keeps_endpoint_order() {
        let repo = repo(MockGraph::new().with_types(
            "Q29908721",
            &[
                ("Q7397", "software"),
                ("Q14001", "malware"),
                ("Q7397", "software"),
            ],
        ));

        let types = repo.resolve_types(&"Q29908721".into()).await.unwrap();
        let ids: Vec<&str> = types.ids().map(EntityId::as_str).collect();
        assert_eq!(ids, ["Q7397", "Q14001"]);
        assert_eq!(
            types.get(&"Q14001".into()).unwrap().label.as_deref(),
            Some("malware")
        );
    }

    #[tokio::test]
    async fn test_label_echoing_id_is_absent() {
        let row = Row::from_pairs([
            ("type", Binding::uri("http://www.wikidata.org/entity/Q999")),
            ("typeLabel", Binding::literal("Q999")),
        ]);
        let repo = repo(MockGraph::new().with_rows("item", "Q1", vec![row]));

        let types = repo.resolve_types(&"Q1".into()).await.unwrap();
        assert_eq!(types.get(&"Q999".into()).unwrap().label, None);
    }

    #[tokio::test]
    async fn test_unknown_entity_has_no_types() {
        let repo = repo(MockGraph::new());
        let types = repo.resolve_types(&"Q123456789".into()).await.unwrap();
        assert!(types.is_empty());
    }

    #[tokio::test]
    async fn test_failure_names_entity() {
        let repo = repo(MockGraph::new().with_failure("Q42"));
        let err = repo.resolve_types(&"Q42".into()).await.unwrap_err();
        match err {
            AppError::Resolution { id, source } => {
                assert_eq!(id, "Q42");
                assert!(matches!(*source, AppError::Transport { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_row_without_type_is_parse_error() {
        let row = Row::from_pairs([("typeLabel", Binding::literal("orphan"))]);
        let repo = repo(MockGraph::new().with_rows("item", "Q1", vec![row]));

        let err = repo.resolve_types(&"Q1".into()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Resolution { ref source, .. } if matches!(**source, AppError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected_before_querying() {
        let graph = Arc::new(MockGraph::new());
        let ctx = Context::new(graph.clone(), Config::default());
        let repo = TypeRepository::from_ref(&ctx);

        let err = repo.resolve_types(&"Q1 }".into()).await.unwrap_err();
        assert!(err.to_string().contains("Q1 }"));
        assert!(graph.queried().is_empty());
    }

    #[tokio::test]
    async fn test_is_type() {
        let repo = repo(
            MockGraph::new()
                .with_answer("item", "Q14001", true)
                .with_answer("item", "Q29908721", false),
        );
        assert!(repo.is_type(&"Q14001".into()).await.unwrap());
        assert!(!repo.is_type(&"Q29908721".into()).await.unwrap());
    }
}
