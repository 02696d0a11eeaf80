//! MCP tool implementations organized by domain.

pub mod glossary;
pub mod search;

use clap::ValueEnum;
use rmcp::{
    schemars::{self, JsonSchema},
    ErrorData as McpError,
};
use serde::Deserialize;

use crate::config::{Config, PolicyPreset};
use crate::error::AppError;
use crate::models::{EntityId, TypeIdSet, TypePolicy};

/// Type policy overrides accepted by classification tools.
///
/// With no fields set, the configured policy applies.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct PolicyParams {
    /// Base policy: "cyber" or "none". Defaults to the configured preset.
    #[serde(default)]
    pub preset: Option<String>,
    /// Type ids of which at least one must be present.
    #[serde(default)]
    pub required: Vec<String>,
    /// Type ids reported on accepted entities.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Type ids that disqualify an entity.
    #[serde(default)]
    pub deny: Vec<String>,
}

impl PolicyParams {
    /// Builds the effective policy on top of the configured or named preset.
    pub fn to_policy(&self, config: &Config) -> Result<TypePolicy, McpError> {
        let base = match &self.preset {
            Some(name) => PolicyPreset::from_str(name, true)
                .map_err(|e| McpError::invalid_params(e, None))?
                .policy(),
            None => config.policy.to_policy()?,
        };

        Ok(base.extended(
            parse_ids(&self.required)?,
            parse_ids(&self.allow)?,
            parse_ids(&self.deny)?,
        )?)
    }
}

/// Parses and validates an entity id supplied by a client.
pub(crate) fn parse_entity(id: &str) -> Result<EntityId, McpError> {
    Ok(EntityId::parse(id)?)
}

fn parse_ids(ids: &[String]) -> Result<TypeIdSet, AppError> {
    ids.iter().map(|id| EntityId::parse(id)).collect()
}
