//! MCP server implementation for Cyberlex.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, ServerHandler},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool_handler,
};

use crate::context::Context;
use crate::di::FromRef;

/// Cyberlex MCP server for knowledge-graph entity search.
///
/// This server provides AI assistants with tools to:
/// - Search entities and filter them by type policy
/// - Resolve and classify the types of known entities
/// - Build glossaries for whole concepts
#[derive(Clone)]
pub struct McpServer {
    pub(crate) ctx: Arc<Context>,
    tool_router: ToolRouter<McpServer>,
}

impl McpServer {
    /// Create a new MCP server with the given context.
    pub fn new(ctx: Context) -> Self {
        tracing::info!("Initializing Cyberlex MCP server");

        Self {
            ctx: Arc::new(ctx),
            tool_router: Self::tool_router(),
        }
    }

    /// Build the combined tool router from all tool modules.
    fn tool_router() -> ToolRouter<Self> {
        Self::search_tools() + Self::glossary_tools()
    }

    /// Resolve a dependency from the context.
    pub fn resolve<T: FromRef<Context>>(&self) -> T {
        T::from_ref(&self.ctx)
    }

    /// Get direct access to the context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                r#"Cyberlex - knowledge-graph search for cybersecurity glossaries

Entities are Wikidata items addressed by id (Q14001) or URI.

## Type Policy

Classification tools accept an optional policy:
- **preset** - "cyber" (built-in allow/deny lists) or "none"
- **required** - at least one of these type ids must be present
- **allow** - type ids reported on accepted entities
- **deny** - any one of these type ids rejects the entity

Omitting all of them applies the server's configured policy.

## Search Tools

- **search_entities** - Text search, deduplicated, filtered by policy, in relevance order
- **classify_entity** - Classify a known entity against a policy
- **resolve_types** - Full transitive type closure of an entity
- **is_type** - Whether an entity is used as a class

## Glossary Tools

- **concept_glossary** - Members of a concept with aliases, superclasses and article text
- **concept_instances** - Instances of a concept with names in en, ru and zh

All tools accept output_format "json" (default) or "toon".
"#
                .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::graph::backends::mock::MockGraph;
    use crate::services::SearchService;

    #[test]
    fn test_server_registers_all_tools() {
        let server = McpServer::new(Context::new(Arc::new(MockGraph::new()), Config::default()));
        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();

        for tool in [
            "search_entities",
            "classify_entity",
            "resolve_types",
            "is_type",
            "concept_glossary",
            "concept_instances",
        ] {
            assert!(names.iter().any(|n| n == tool), "missing tool {tool}");
        }

        let _search: SearchService = server.resolve();
        assert!(server.get_info().instructions.is_some());
    }
}
