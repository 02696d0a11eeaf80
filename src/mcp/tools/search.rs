//! Entity search and classification tools.

use std::sync::Arc;

use clap::ValueEnum;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

use super::{parse_entity, PolicyParams};
use crate::config::Config;
use crate::mcp::protocol::{OutputFormat, Response};
use crate::mcp::server::McpServer;
use crate::models::{EntityId, Hit, TypeSet};
use crate::repositories::TypeRepository;
use crate::services::{Classification, ResolutionMode, SearchOptions, SearchService};

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters for search_entities tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchEntitiesParams {
    /// Free-text search, matched against labels and aliases.
    pub query: String,
    /// Candidates requested from the upstream search (default from config).
    #[serde(default)]
    pub limit: Option<usize>,
    /// "abort" (default) fails on the first unresolvable candidate,
    /// "skip" drops it.
    #[serde(default)]
    pub on_error: Option<String>,
    /// Keep hits matching no required or allowed type (default false).
    #[serde(default)]
    pub keep_unmatched: Option<bool>,
    #[serde(flatten)]
    pub policy: PolicyParams,
    /// Output format: json (default) or toon.
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

/// Parameters for classify_entity tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClassifyEntityParams {
    /// Entity id (e.g. "Q29908721") or entity URI.
    pub entity_id: String,
    #[serde(flatten)]
    pub policy: PolicyParams,
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

/// Parameters for tools taking a single entity.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct EntityParams {
    /// Entity id (e.g. "Q14001") or entity URI.
    pub entity_id: String,
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SearchEntitiesResult {
    pub query: String,
    pub hits: Vec<Hit>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ClassifyEntityResult {
    pub id: EntityId,
    #[serde(flatten)]
    pub classification: Classification,
}

#[derive(Debug, Serialize)]
pub struct ResolveTypesResult {
    pub id: EntityId,
    pub types: TypeSet,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct IsTypeResult {
    pub id: EntityId,
    pub is_type: bool,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router(router = search_tools, vis = "pub(crate)")]
impl McpServer {
    /// Search the knowledge graph and keep entities accepted by the type policy.
    ///
    /// Hits keep the upstream relevance order. Each hit carries the
    /// required or allowed types that matched.
    #[tool(
        description = "Search entities by text and filter them by type policy (required/allow/deny type ids)."
    )]
    pub async fn search_entities(
        &self,
        Parameters(params): Parameters<SearchEntitiesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(query = %params.query, limit = ?params.limit, "Running search_entities tool");

        let config = self.resolve::<Arc<Config>>();
        let policy = params.policy.to_policy(&config)?;

        let mut options = SearchOptions::from_config(&config.search);
        if let Some(limit) = params.limit {
            options = options.with_limit(limit);
        }
        if let Some(mode) = params.on_error.as_deref() {
            let mode = ResolutionMode::from_str(mode, true)
                .map_err(|e| McpError::invalid_params(e, None))?;
            options = options.with_resolution(mode);
        }
        if let Some(keep) = params.keep_unmatched {
            options = options.with_keep_unmatched(keep);
        }

        let hits = self
            .resolve::<SearchService>()
            .search(&params.query, &policy, &options)
            .await?;

        let response = SearchEntitiesResult {
            count: hits.len(),
            query: params.query,
            hits,
        };

        Response(response, params.output_format).into()
    }

    /// Resolve and classify one known entity against a type policy.
    #[tool(description = "Classify an entity id against a type policy. Returns accepted with matched types, or rejected.")]
    pub async fn classify_entity(
        &self,
        Parameters(params): Parameters<ClassifyEntityParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(entity_id = %params.entity_id, "Running classify_entity tool");

        let id = parse_entity(&params.entity_id)?;
        let config = self.resolve::<Arc<Config>>();
        let policy = params.policy.to_policy(&config)?;

        let classification = self
            .resolve::<SearchService>()
            .classify_entity(&id, &policy)
            .await?;

        tracing::info!(id = %id, accepted = classification.is_accepted(), "Classified entity");

        Response(ClassifyEntityResult { id, classification }, params.output_format).into()
    }

    /// List the full transitive type closure of an entity.
    #[tool(description = "Resolve all types of an entity (instance-of with subclass chains, plus superclasses).")]
    pub async fn resolve_types(
        &self,
        Parameters(params): Parameters<EntityParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(entity_id = %params.entity_id, "Running resolve_types tool");

        let id = parse_entity(&params.entity_id)?;
        let types = self.resolve::<TypeRepository>().resolve_types(&id).await?;

        let response = ResolveTypesResult {
            count: types.len(),
            id,
            types,
        };

        Response(response, params.output_format).into()
    }

    /// Check whether an entity takes part in the class hierarchy.
    #[tool(description = "Check whether an entity is a type: it has instances, subclasses or superclasses.")]
    pub async fn is_type(
        &self,
        Parameters(params): Parameters<EntityParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(entity_id = %params.entity_id, "Running is_type tool");

        let id = parse_entity(&params.entity_id)?;
        let is_type = self.resolve::<TypeRepository>().is_type(&id).await?;

        Response(IsTypeResult { id, is_type }, params.output_format).into()
    }
}
