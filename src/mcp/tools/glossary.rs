//! Concept glossary tools.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

use super::parse_entity;
use crate::mcp::protocol::{OutputFormat, Response};
use crate::mcp::server::McpServer;
use crate::models::{EntityId, GlossaryEntry};
use crate::services::GlossaryService;

/// Default number of instances returned by concept_instances.
const DEFAULT_INSTANCE_LIMIT: usize = 100;

/// Parameters for concept_glossary tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ConceptGlossaryParams {
    /// Concept type id, e.g. "Q14001" (malware).
    pub concept_id: String,
    /// Fetch the introduction of each linked article (slower).
    #[serde(default)]
    pub with_text: bool,
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

/// Parameters for concept_instances tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ConceptInstancesParams {
    /// Concept type id, e.g. "Q1248784" (airport).
    pub concept_id: String,
    /// Maximum number of instances (default: 100).
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

#[derive(Debug, Serialize)]
pub struct ConceptGlossaryResult {
    pub concept: EntityId,
    pub entries: Vec<GlossaryEntry>,
    pub count: usize,
}

#[tool_router(router = glossary_tools, vis = "pub(crate)")]
impl McpServer {
    /// Build glossary entries for every member of a concept.
    #[tool(
        description = "List every subclass or instance of a concept with description, aliases, superclasses, types and article link."
    )]
    pub async fn concept_glossary(
        &self,
        Parameters(params): Parameters<ConceptGlossaryParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(concept_id = %params.concept_id, with_text = params.with_text, "Running concept_glossary tool");

        let concept = parse_entity(&params.concept_id)?;
        let entries = self
            .resolve::<GlossaryService>()
            .build(&concept, params.with_text)
            .await?;

        tracing::info!(count = entries.len(), "Built concept glossary");

        let response = ConceptGlossaryResult {
            count: entries.len(),
            concept,
            entries,
        };
        Response(response, params.output_format).into()
    }

    /// List instances of a concept with names in several languages.
    #[tool(description = "List instances of a concept with names and aliases in en, ru and zh.")]
    pub async fn concept_instances(
        &self,
        Parameters(params): Parameters<ConceptInstancesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(concept_id = %params.concept_id, limit = ?params.limit, "Running concept_instances tool");

        let concept = parse_entity(&params.concept_id)?;
        let instances = self
            .resolve::<GlossaryService>()
            .instances(&concept, params.limit.unwrap_or(DEFAULT_INSTANCE_LIMIT))
            .await?;

        Response(instances, params.output_format).into()
    }
}
